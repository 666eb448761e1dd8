//! Spectrum frames to drawable polylines
//!
//! Frequency runs logarithmically from the configured minimum to maximum
//! across the width, level runs linearly from the negative-infinity floor
//! (bottom edge) to the top of the display range (top edge).

use mbcomp_core::config::AnalyzerConfig;
use mbcomp_core::fifo::{fifo, FifoConsumer, FifoProducer, SlotExchange};

/// Point in display coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in display coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Connected polyline, drawn in point order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerPath {
    points: Vec<Point>,
}

impl AnalyzerPath {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

impl SlotExchange for AnalyzerPath {
    fn can_swap_into(slot: &Self, incoming: &Self) -> bool {
        incoming.points.capacity() >= slot.points.capacity()
    }
}

/// Linear remap of `value` from `[source_min, source_max]` to `[target_min, target_max]`
#[inline]
pub fn jmap(value: f32, source_min: f32, source_max: f32, target_min: f32, target_max: f32) -> f32 {
    target_min + (value - source_min) * (target_max - target_min) / (source_max - source_min)
}

/// Position of `value` between `min` and `max` on a log10 scale (0..1 in range)
#[inline]
pub fn map_from_log10(value: f32, min: f32, max: f32) -> f32 {
    (value / min).log10() / (max / min).log10()
}

/// Level that lands exactly on the bottom edge of `component` when the
/// analysis area `fft_bounds` spans `[negative_infinity, max_db]`
///
/// Lets the trace reach the bottom of a component that is taller than the
/// analysis area.
pub fn negative_infinity_for_area(
    component_bottom: f32,
    fft_bounds: Rect,
    negative_infinity: f32,
    max_db: f32,
) -> f32 {
    jmap(
        component_bottom,
        fft_bounds.bottom(),
        fft_bounds.y,
        negative_infinity,
        max_db,
    )
}

/// Turns dB frames into [`AnalyzerPath`]s and queues them
pub struct AnalyzerPathGenerator {
    min_frequency: f32,
    max_frequency: f32,
    max_db: f32,
    path_resolution: usize,
    scratch: AnalyzerPath,
    producer: FifoProducer<AnalyzerPath>,
    consumer: FifoConsumer<AnalyzerPath>,
}

/// Points reserved per path slot, enough for any realistic display width
const PATH_POINT_CAPACITY: usize = 4096;

impl AnalyzerPathGenerator {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let (producer, consumer) = fifo(config.path_fifo_capacity.max(1), || {
            AnalyzerPath::with_capacity(PATH_POINT_CAPACITY)
        });
        Self {
            min_frequency: config.min_frequency,
            max_frequency: config.max_frequency,
            max_db: config.max_db,
            path_resolution: config.path_resolution.max(1),
            scratch: AnalyzerPath::with_capacity(PATH_POINT_CAPACITY),
            producer,
            consumer,
        }
    }

    /// Build one path from `render_data` and queue it
    ///
    /// The first point sits on the left edge at bin 0's level. Every
    /// `path_resolution`-th bin after that adds a point; bins whose level
    /// maps to a non-finite y are skipped, and a non-finite first level is
    /// drawn on the bottom edge. Returns `false` when the queue is full.
    pub fn generate_path(
        &mut self,
        render_data: &[f32],
        fft_bounds: Rect,
        fft_size: usize,
        bin_width: f32,
        negative_infinity: f32,
    ) -> bool {
        let top = fft_bounds.y;
        let bottom = fft_bounds.bottom();
        let width = fft_bounds.width;
        let num_bins = (fft_size / 2).min(render_data.len());
        let max_db = self.max_db;

        // Finite levels below the floor stay on the bottom edge
        let map = |v: f32| {
            let y = jmap(v, negative_infinity, max_db, bottom, top);
            if y.is_finite() {
                y.min(bottom)
            } else {
                y
            }
        };

        self.scratch.clear();
        if num_bins == 0 {
            return self.producer.push(&self.scratch);
        }

        let mut y = map(render_data[0]);
        if !y.is_finite() {
            y = bottom;
        }
        self.scratch.push(Point::new(fft_bounds.x, y));

        for bin in (1..num_bins).step_by(self.path_resolution) {
            let y = map(render_data[bin]);
            if !y.is_finite() {
                continue;
            }
            let bin_freq = bin as f32 * bin_width;
            let normalized_x = map_from_log10(bin_freq, self.min_frequency, self.max_frequency);
            let x = fft_bounds.x + (normalized_x * width).floor();
            self.scratch.push(Point::new(x, y));
        }

        self.producer.push(&self.scratch)
    }

    pub fn num_paths_available(&self) -> usize {
        self.consumer.num_available_for_reading()
    }

    /// Take the oldest queued path into `path`
    pub fn get_path(&mut self, path: &mut AnalyzerPath) -> bool {
        self.consumer.exchange(path)
    }

    /// Drain every queued path, oldest first
    ///
    /// The iterator ends once the queue is empty and is not meant to be
    /// reused; call again on the next draw cycle.
    pub fn paths(&mut self) -> impl Iterator<Item = AnalyzerPath> + '_ {
        self.consumer.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> AnalyzerPathGenerator {
        AnalyzerPathGenerator::new(&AnalyzerConfig::default())
    }

    #[test]
    fn test_jmap_and_log_mapping() {
        assert_eq!(jmap(-72.0, -72.0, 12.0, 300.0, 0.0), 300.0);
        assert_eq!(jmap(12.0, -72.0, 12.0, 300.0, 0.0), 0.0);
        assert!((map_from_log10(20.0, 20.0, 20000.0)).abs() < 1e-6);
        assert!((map_from_log10(20000.0, 20.0, 20000.0) - 1.0).abs() < 1e-6);
        assert!((map_from_log10(632.456, 20.0, 20000.0) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_floor_maps_to_bottom_and_max_to_top() {
        let mut gen = generator();
        let bounds = Rect::new(10.0, 20.0, 400.0, 200.0);
        let mut data = vec![-72.0; 1024];
        data[0] = 12.0;
        assert!(gen.generate_path(&data, bounds, 2048, 48000.0 / 2048.0, -72.0));

        let mut path = AnalyzerPath::default();
        assert!(gen.get_path(&mut path));
        let points = path.points();
        assert_eq!(points[0], Point::new(10.0, 20.0));
        assert!(points[1..].iter().all(|p| p.y == 220.0));
    }

    #[test]
    fn test_path_resolution_and_x_ordering() {
        let mut gen = generator();
        let bounds = Rect::new(0.0, 0.0, 1000.0, 100.0);
        let data = vec![0.0; 1024];
        gen.generate_path(&data, bounds, 2048, 48000.0 / 2048.0, -72.0);

        let mut path = AnalyzerPath::default();
        gen.get_path(&mut path);
        // Bin 0 plus bins 1, 3, 5, ... 1023
        assert_eq!(path.len(), 1 + 512);
        let xs: Vec<f32> = path.points()[1..].iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[1] >= w[0]));
        // Bin 1023 is ~23.98kHz, past the right edge
        assert!(*xs.last().unwrap() > 1000.0);
    }

    #[test]
    fn test_non_finite_levels_never_reach_the_path() {
        let mut gen = generator();
        let bounds = Rect::new(0.0, 0.0, 500.0, 300.0);
        let mut data = vec![-20.0; 1024];
        data[0] = f32::NAN;
        data[1] = f32::NEG_INFINITY;
        data[3] = f32::NAN;
        data[5] = f32::INFINITY;
        gen.generate_path(&data, bounds, 2048, 48000.0 / 2048.0, -72.0);

        let mut path = AnalyzerPath::default();
        gen.get_path(&mut path);
        assert!(path.points().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        // A non-finite first level starts the path on the bottom edge
        assert_eq!(path.points()[0].y, 300.0);
        // Bins 1, 3 and 5 are dropped, so the next point is bin 7
        assert_eq!(path.len(), 1 + 512 - 3);
        let expected_y = jmap(-20.0, -72.0, 12.0, 300.0, 0.0);
        assert_eq!(path.points()[1].y, expected_y);
    }

    #[test]
    fn test_levels_below_floor_stay_on_bottom_edge() {
        let mut gen = generator();
        let bounds = Rect::new(0.0, 0.0, 500.0, 300.0);
        gen.generate_path(&vec![-120.0; 1024], bounds, 2048, 48000.0 / 2048.0, -72.0);

        let mut path = AnalyzerPath::default();
        gen.get_path(&mut path);
        assert!(path.points().iter().all(|p| p.y == 300.0));
    }

    #[test]
    fn test_negative_infinity_for_taller_component() {
        let area = Rect::new(0.0, 0.0, 100.0, 84.0);
        // 84px spans 84dB; 12px more below the area is 12dB lower
        let floor = negative_infinity_for_area(96.0, area, -72.0, 12.0);
        assert!((floor + 84.0).abs() < 1e-4);
        assert_eq!(negative_infinity_for_area(84.0, area, -72.0, 12.0), -72.0);
    }

    #[test]
    fn test_drain_yields_every_path_once() {
        let mut gen = generator();
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        for level in [-60.0, -30.0, 0.0] {
            gen.generate_path(&vec![level; 16], bounds, 32, 1500.0, -72.0);
        }
        assert_eq!(gen.num_paths_available(), 3);
        let first_ys: Vec<f32> = gen.paths().map(|p| p.points()[0].y).collect();
        assert_eq!(first_ys.len(), 3);
        assert!(first_ys[0] > first_ys[1] && first_ys[1] > first_ys[2]);
        assert_eq!(gen.paths().count(), 0);
    }
}

//! Per-channel spectrum path pipeline
//!
//! One [`PathProducer`] per analyzer channel, run from the UI timer:
//!
//! ```text
//!  SampleFifoReader ─▶ SlidingWindow ─▶ FftDataGenerator ─▶ AnalyzerPathGenerator ─▶ path
//!   (host blocks)      (fft_size)       (dB frames)         (polylines)             (newest)
//! ```
//!
//! Each incoming block is carried all the way to a finished path before the
//! next block is read, so the frame and path queues never hold more than one
//! entry and their capacity cannot cut off newer audio. Only the newest path
//! is kept for drawing; a slow display skips frames instead of lagging.

use mbcomp_core::config::{AnalyzerConfig, FftOrder};
use mbcomp_core::sample_fifo::{Channel, SampleFifoReader, SlidingWindow};

use crate::fft::FftDataGenerator;
use crate::path::{AnalyzerPath, AnalyzerPathGenerator, Rect};

pub struct PathProducer {
    reader: SampleFifoReader,
    incoming: Vec<f32>,
    window: SlidingWindow,
    fft: FftDataGenerator,
    generator: AnalyzerPathGenerator,
    frame: Vec<f32>,
    path: AnalyzerPath,
    negative_infinity: f32,
}

impl PathProducer {
    pub fn new(reader: SampleFifoReader, config: &AnalyzerConfig) -> Self {
        let fft = FftDataGenerator::new(config.fft_order, config.path_fifo_capacity);
        Self {
            incoming: Vec::with_capacity(reader.max_chunk_samples()),
            reader,
            window: SlidingWindow::new(fft.fft_size()),
            frame: Vec::with_capacity(fft.num_bins()),
            fft,
            generator: AnalyzerPathGenerator::new(config),
            path: AnalyzerPath::default(),
            negative_infinity: config.negative_infinity_db,
        }
    }

    pub fn channel(&self) -> Channel {
        self.reader.channel()
    }

    /// Drain new audio and refresh [`Self::path`]
    ///
    /// One spectrum frame is produced per incoming block, each over the
    /// latest `fft_size` samples. Returns `true` if the path changed.
    pub fn process(&mut self, fft_bounds: Rect, sample_rate: f64) -> bool {
        let bin_width = (sample_rate / self.fft.fft_size() as f64) as f32;
        let mut updated = false;

        while self.reader.num_complete_buffers_available() > 0 {
            if !self.reader.get_audio_buffer(&mut self.incoming) {
                break;
            }
            self.window.append(&self.incoming);
            if self
                .fft
                .produce_fft_data_for_rendering(self.window.as_slice(), self.negative_infinity)
            {
                updated |= self.render_pending(fft_bounds, bin_width);
            } else {
                log::debug!("PathProducer {:?}: frame queue full", self.channel());
            }
        }
        updated
    }

    /// Turn every queued frame into a path and keep the last one
    fn render_pending(&mut self, fft_bounds: Rect, bin_width: f32) -> bool {
        let fft_size = self.fft.fft_size();
        while self.fft.num_available_fft_data_blocks() > 0 {
            if !self.fft.get_fft_data(&mut self.frame) {
                break;
            }
            self.generator.generate_path(
                &self.frame,
                fft_bounds,
                fft_size,
                bin_width,
                self.negative_infinity,
            );
        }

        let mut updated = false;
        while self.generator.num_paths_available() > 0 {
            updated |= self.generator.get_path(&mut self.path);
        }
        updated
    }

    /// Newest completed path
    pub fn path(&self) -> &AnalyzerPath {
        &self.path
    }

    /// Floor for new frames and the level mapped to the bottom edge
    pub fn update_negative_infinity(&mut self, negative_infinity: f32) {
        self.negative_infinity = negative_infinity;
    }

    pub fn negative_infinity(&self) -> f32 {
        self.negative_infinity
    }

    /// Switch FFT size; the analysis window restarts from silence
    pub fn change_order(&mut self, order: FftOrder) {
        self.fft.change_order(order);
        self.window.resize(self.fft.fft_size());
    }

    pub fn fft_size(&self) -> usize {
        self.fft.fft_size()
    }

    /// Blocks the audio thread had to discard for this channel
    pub fn dropped_blocks(&self) -> usize {
        self.reader.dropped_blocks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbcomp_core::sample_fifo::sample_fifo;
    use mbcomp_core::types::AudioBuffer;

    const SR: f64 = 48000.0;

    fn sine_block(freq: f32, len: usize, offset: usize) -> AudioBuffer {
        let samples: Vec<f32> = (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * (i + offset) as f32 / SR as f32).sin())
            .collect();
        AudioBuffer::from_channels(&[&samples])
    }

    #[test]
    fn test_no_audio_leaves_path_empty() {
        let (_tx, rx) = sample_fifo(Channel::Left, 8, 1024);
        let mut producer = PathProducer::new(rx, &AnalyzerConfig::default());
        assert!(!producer.process(Rect::new(0.0, 0.0, 600.0, 300.0), SR));
        assert!(producer.path().is_empty());
    }

    #[test]
    fn test_keeps_newest_path_only() {
        let (mut tx, rx) = sample_fifo(Channel::Left, 30, 1024);
        let mut producer = PathProducer::new(rx, &AnalyzerConfig::default());

        // Four blocks of silence, then one loud block
        for _ in 0..4 {
            tx.update(&AudioBuffer::new(1, 512));
        }
        tx.update(&sine_block(1000.0, 2048, 0));

        let bounds = Rect::new(0.0, 0.0, 600.0, 300.0);
        assert!(producer.process(bounds, SR));

        // The path drawn is the one from the sine, not the silent ones
        let min_y = producer.path().points().iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!(min_y < 100.0, "loudest point at y {}", min_y);
    }

    #[test]
    fn test_spectrum_peak_lands_near_tone_frequency() {
        let (mut tx, rx) = sample_fifo(Channel::Left, 30, 4096);
        let config = AnalyzerConfig::default();
        let mut producer = PathProducer::new(rx, &config);
        tx.update(&sine_block(1000.0, 2048, 0));

        let bounds = Rect::new(0.0, 0.0, 900.0, 300.0);
        producer.process(bounds, SR);

        let peak = producer
            .path()
            .points()
            .iter()
            .skip(1)
            .fold(producer.path().points()[1], |best, p| if p.y < best.y { *p } else { best });
        // 1kHz sits at log10(50)/3 of the width
        let expected_x = (1000.0f32 / 20.0).log10() / 3.0 * 900.0;
        assert!((peak.x - expected_x).abs() < 15.0, "peak at x {} expected {}", peak.x, expected_x);
    }

    #[test]
    fn test_newest_block_drawn_when_backlog_exceeds_path_queue() {
        let (mut tx, rx) = sample_fifo(Channel::Left, 60, 2048);
        let config = AnalyzerConfig {
            path_fifo_capacity: 4,
            ..AnalyzerConfig::default()
        };
        let mut producer = PathProducer::new(rx, &config);

        for _ in 0..9 {
            tx.update(&AudioBuffer::new(1, 2048));
        }
        tx.update(&sine_block(1000.0, 2048, 0));

        assert!(producer.process(Rect::new(0.0, 0.0, 600.0, 300.0), SR));
        let min_y = producer.path().points().iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!(min_y < 100.0, "loudest point at y {}", min_y);
    }

    #[test]
    fn test_incoming_buffer_sized_for_swaps() {
        let (_tx, rx) = sample_fifo(Channel::Left, 8, 1024);
        let producer = PathProducer::new(rx, &AnalyzerConfig::default());
        assert!(producer.incoming.capacity() >= 1024);
    }

    #[test]
    fn test_negative_infinity_moves_floor() {
        let (mut tx, rx) = sample_fifo(Channel::Left, 8, 1024);
        let mut producer = PathProducer::new(rx, &AnalyzerConfig::default());
        producer.update_negative_infinity(-48.0);
        assert_eq!(producer.negative_infinity(), -48.0);

        tx.update(&AudioBuffer::new(1, 256));
        let bounds = Rect::new(0.0, 0.0, 600.0, 300.0);
        producer.process(bounds, SR);
        assert!(producer.path().points().iter().all(|p| p.y == 300.0));
    }

    #[test]
    fn test_change_order_resizes_window() {
        let (_tx, rx) = sample_fifo(Channel::Right, 8, 1024);
        let mut producer = PathProducer::new(rx, &AnalyzerConfig::default());
        producer.change_order(FftOrder::Order4096);
        assert_eq!(producer.fft_size(), 4096);
        assert_eq!(producer.channel(), Channel::Right);
    }
}

//! Both analyzer channels plus band meters, driven from one UI timer

use std::sync::Arc;

use mbcomp_core::config::{AnalyzerConfig, FftOrder};
use mbcomp_core::dsp::BandLevels;
use mbcomp_core::processor::AnalyzerTaps;
use mbcomp_core::types::NUM_BANDS;

use crate::meters::BandMeterSnapshot;
use crate::path::{negative_infinity_for_area, AnalyzerPath, Rect};
use crate::producer::PathProducer;

/// UI-side consumer of a processor's [`AnalyzerTaps`]
///
/// ## Usage
///
/// ```ignore
/// let (processor, taps) = MultibandProcessor::new(params, &config.processor);
/// let mut analyzer = SpectrumAnalyzer::new(taps, &config.analyzer);
///
/// // On resize
/// analyzer.fit_to_component(component_bottom, fft_bounds);
///
/// // Every timer tick (~60 Hz)
/// analyzer.process(fft_bounds, sample_rate);
/// draw(analyzer.left_path(), analyzer.right_path(), analyzer.meters());
/// ```
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    left: PathProducer,
    right: PathProducer,
    levels: [Arc<BandLevels>; NUM_BANDS],
    enabled: bool,
}

impl SpectrumAnalyzer {
    pub fn new(taps: AnalyzerTaps, config: &AnalyzerConfig) -> Self {
        log::info!(
            "SpectrumAnalyzer: fft size {}, floor {} dB",
            config.fft_order.fft_size(),
            config.negative_infinity_db
        );
        Self {
            config: config.clone(),
            left: PathProducer::new(taps.left, config),
            right: PathProducer::new(taps.right, config),
            levels: taps.levels,
            enabled: true,
        }
    }

    /// Refresh both channel paths (no-op while disabled)
    pub fn process(&mut self, fft_bounds: Rect, sample_rate: f64) {
        if !self.enabled {
            return;
        }
        self.left.process(fft_bounds, sample_rate);
        self.right.process(fft_bounds, sample_rate);
    }

    /// Stretch the floor so traces reach `component_bottom`
    pub fn fit_to_component(&mut self, component_bottom: f32, fft_bounds: Rect) {
        let floor = negative_infinity_for_area(
            component_bottom,
            fft_bounds,
            self.config.negative_infinity_db,
            self.config.max_db,
        );
        log::debug!("SpectrumAnalyzer: negative infinity {}", floor);
        self.set_negative_infinity(floor);
    }

    pub fn set_negative_infinity(&mut self, negative_infinity: f32) {
        self.left.update_negative_infinity(negative_infinity);
        self.right.update_negative_infinity(negative_infinity);
    }

    pub fn change_order(&mut self, order: FftOrder) {
        self.config.fft_order = order;
        self.left.change_order(order);
        self.right.change_order(order);
    }

    /// Pause or resume spectrum analysis (meters keep working)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn left_path(&self) -> &AnalyzerPath {
        self.left.path()
    }

    pub fn right_path(&self) -> &AnalyzerPath {
        self.right.path()
    }

    pub fn meters(&self) -> BandMeterSnapshot {
        BandMeterSnapshot::capture(&self.levels)
    }

    /// Blocks the audio thread discarded, (left, right)
    pub fn dropped_blocks(&self) -> (usize, usize) {
        (self.left.dropped_blocks(), self.right.dropped_blocks())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

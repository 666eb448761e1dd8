//! One band's compressor plus its live parameter handles and level meters

use std::sync::Arc;

use crate::dsp::compressor::Compressor;
use crate::dsp::router::BandRouting;
use crate::params::{AtomicF32, ParamId, ParameterStore};
use crate::types::{gain_to_db, AudioBuffer, Band, ProcessSpec, NEG_INFINITY_DB};

/// Pre/post compression RMS of one band, in dB
///
/// Written by the audio thread once per block, read by the UI at any time.
#[derive(Debug)]
pub struct BandLevels {
    input_db: AtomicF32,
    output_db: AtomicF32,
}

impl BandLevels {
    pub fn new() -> Self {
        Self {
            input_db: AtomicF32::new(NEG_INFINITY_DB),
            output_db: AtomicF32::new(NEG_INFINITY_DB),
        }
    }

    pub fn input_db(&self) -> f32 {
        self.input_db.load()
    }

    pub fn output_db(&self) -> f32 {
        self.output_db.load()
    }

    fn publish(&self, input_db: f32, output_db: f32) {
        self.input_db.store(input_db);
        self.output_db.store(output_db);
    }
}

impl Default for BandLevels {
    fn default() -> Self {
        Self::new()
    }
}

/// Compressor for a single band
///
/// Parameters are read through [`ParamId`] handles into a shared store,
/// never owned here.
pub struct CompressorBand {
    band: Band,
    params: Arc<ParameterStore>,
    compressor: Compressor,
    levels: Arc<BandLevels>,
}

impl CompressorBand {
    pub fn new(band: Band, params: Arc<ParameterStore>) -> Self {
        Self {
            band,
            params,
            compressor: Compressor::new(),
            levels: Arc::new(BandLevels::new()),
        }
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.compressor.prepare(spec);
    }

    /// Pull attack, release, threshold and ratio from the parameter store
    ///
    /// Call once at the start of each block, before [`Self::process`].
    pub fn update_compressor_settings(&mut self) {
        let p = &self.params;
        self.compressor.set_attack(p.get(ParamId::attack(self.band)));
        self.compressor.set_release(p.get(ParamId::release(self.band)));
        self.compressor.set_threshold(p.get(ParamId::threshold(self.band)));
        self.compressor.set_ratio(p.choice_value(ParamId::ratio(self.band)));
    }

    /// Compress `buffer` in place and publish pre/post RMS
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        let pre_rms = average_rms(buffer);

        let bypassed = self.is_bypassed();
        self.compressor.process(buffer, bypassed);

        let post_rms = average_rms(buffer);

        self.levels.publish(
            gain_to_db(pre_rms, NEG_INFINITY_DB),
            gain_to_db(post_rms, NEG_INFINITY_DB),
        );
    }

    /// Clear the envelope follower
    pub fn reset(&mut self) {
        self.compressor.reset();
    }

    pub fn is_bypassed(&self) -> bool {
        self.params.get_bool(ParamId::bypassed(self.band))
    }

    /// Current solo/mute flags
    pub fn routing(&self) -> BandRouting {
        BandRouting::new(
            self.params.get_bool(ParamId::solo(self.band)),
            self.params.get_bool(ParamId::mute(self.band)),
        )
    }

    pub fn rms_input_level_db(&self) -> f32 {
        self.levels.input_db()
    }

    pub fn rms_output_level_db(&self) -> f32 {
        self.levels.output_db()
    }

    /// Shared handle to this band's meters
    pub fn levels(&self) -> Arc<BandLevels> {
        Arc::clone(&self.levels)
    }
}

/// RMS of each channel, averaged across channels
fn average_rms(buffer: &AudioBuffer) -> f32 {
    let num_channels = buffer.num_channels();
    if num_channels == 0 {
        return 0.0;
    }
    let sum: f32 = (0..num_channels).map(|ch| buffer.rms_level(ch)).sum();
    sum / num_channels as f32
}

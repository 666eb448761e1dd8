//! Per-band level readout for the analyzer overlay

use std::sync::Arc;

use mbcomp_core::dsp::BandLevels;
use mbcomp_core::types::{Band, NUM_BANDS};

/// One band's levels at the moment of capture, in dB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMeter {
    pub input_db: f32,
    pub output_db: f32,
}

impl BandMeter {
    /// Output minus input: negative while the band is compressing
    pub fn gain_reduction_db(&self) -> f32 {
        self.output_db - self.input_db
    }
}

/// Levels of all three bands, read together once per UI tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMeterSnapshot {
    bands: [BandMeter; NUM_BANDS],
}

impl BandMeterSnapshot {
    pub fn capture(levels: &[Arc<BandLevels>; NUM_BANDS]) -> Self {
        Self {
            bands: std::array::from_fn(|i| BandMeter {
                input_db: levels[i].input_db(),
                output_db: levels[i].output_db(),
            }),
        }
    }

    pub fn band(&self, band: Band) -> BandMeter {
        self.bands[band.index()]
    }

    pub fn gain_reduction_db(&self, band: Band) -> f32 {
        self.band(band).gain_reduction_db()
    }

    /// Flattened as low in, low out, mid in, mid out, high in, high out
    pub fn as_values(&self) -> [f32; NUM_BANDS * 2] {
        let mut values = [0.0; NUM_BANDS * 2];
        for (i, meter) in self.bands.iter().enumerate() {
            values[i * 2] = meter.input_db;
            values[i * 2 + 1] = meter.output_db;
        }
        values
    }
}

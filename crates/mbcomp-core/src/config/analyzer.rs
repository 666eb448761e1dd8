//! Spectrum analyzer settings

use serde::{Deserialize, Serialize};

use crate::fifo::DEFAULT_FIFO_CAPACITY;
use crate::types::{MAX_DB, MAX_FREQUENCY, MIN_FREQUENCY, NEG_INFINITY_DB};

/// FFT size as a power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FftOrder {
    #[default]
    Order2048,
    Order4096,
    Order8192,
}

impl FftOrder {
    /// log2 of the FFT size
    pub fn order(self) -> u32 {
        match self {
            FftOrder::Order2048 => 11,
            FftOrder::Order4096 => 12,
            FftOrder::Order8192 => 13,
        }
    }

    /// Number of samples per FFT
    pub fn fft_size(self) -> usize {
        1 << self.order()
    }
}

/// Analyzer configuration
///
/// Read by the UI side only; changing it never touches the audio thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// FFT size used for spectrum frames
    /// Default: Order2048
    pub fft_order: FftOrder,

    /// Slots in the frame and path channels
    /// Default: 30
    pub path_fifo_capacity: usize,

    /// Level drawn at the bottom edge, in dB
    /// Also the floor substituted for silent bins.
    /// Default: -72.0
    pub negative_infinity_db: f32,

    /// Level drawn at the top edge, in dB
    /// Default: 12.0
    pub max_db: f32,

    /// Frequency at the left edge, in Hz
    /// Default: 20.0
    pub min_frequency: f32,

    /// Frequency at the right edge, in Hz
    /// Default: 20000.0
    pub max_frequency: f32,

    /// FFT bins per drawn point
    /// Default: 2
    pub path_resolution: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_order: FftOrder::default(),
            path_fifo_capacity: DEFAULT_FIFO_CAPACITY,
            negative_infinity_db: NEG_INFINITY_DB,
            max_db: MAX_DB,
            min_frequency: MIN_FREQUENCY,
            max_frequency: MAX_FREQUENCY,
            path_resolution: 2,
        }
    }
}

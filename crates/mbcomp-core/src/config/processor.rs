//! Realtime processor settings

use serde::{Deserialize, Serialize};

use crate::fifo::DEFAULT_FIFO_CAPACITY;

/// Processor configuration, fixed for the lifetime of a processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Ramp length for input/output trim changes, in seconds
    /// Default: 0.05 (50ms)
    pub gain_ramp_seconds: f64,

    /// Slots in each analyzer sample channel
    /// Default: 30
    pub fifo_capacity: usize,

    /// Samples per sample-channel slot
    /// Host blocks longer than this are pushed as several chunks.
    /// Default: 4096
    pub max_chunk_samples: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            gain_ramp_seconds: 0.05,
            fifo_capacity: DEFAULT_FIFO_CAPACITY,
            max_chunk_samples: 4096,
        }
    }
}

impl ProcessorConfig {
    /// Copy with zero capacities and negative ramps replaced by defaults
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            gain_ramp_seconds: if self.gain_ramp_seconds.is_finite() && self.gain_ramp_seconds >= 0.0 {
                self.gain_ramp_seconds
            } else {
                defaults.gain_ramp_seconds
            },
            fifo_capacity: if self.fifo_capacity > 0 {
                self.fifo_capacity
            } else {
                defaults.fifo_capacity
            },
            max_chunk_samples: if self.max_chunk_samples > 0 {
                self.max_chunk_samples
            } else {
                defaults.max_chunk_samples
            },
        }
    }
}

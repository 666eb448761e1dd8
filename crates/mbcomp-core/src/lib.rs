//! mbcomp core - Three-band compressor signal chain
//!
//! Realtime half of the compressor: crossover, per-band compression,
//! solo/mute recombination and trim, plus the lock-free channels that carry
//! audio and levels out to the analyzer.

pub mod config;
pub mod dsp;
pub mod error;
pub mod fifo;
pub mod params;
pub mod processor;
pub mod sample_fifo;
pub mod types;

pub use error::{ProcessorError, ProcessorResult};
pub use params::{ParamId, ParameterStore};
pub use processor::{AnalyzerTaps, MultibandProcessor};
pub use types::*;

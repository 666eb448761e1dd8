//! mbcomp analyzer - UI-rate consumer of the realtime core
//!
//! Turns the sample blocks and band levels published by
//! [`mbcomp_core::MultibandProcessor`] into spectrum polylines and meter
//! readings. Nothing here runs on the audio thread.

pub mod analyzer;
pub mod fft;
pub mod meters;
pub mod path;
pub mod producer;

pub use analyzer::SpectrumAnalyzer;
pub use fft::FftDataGenerator;
pub use meters::{BandMeter, BandMeterSnapshot};
pub use path::{AnalyzerPath, AnalyzerPathGenerator, Point, Rect};
pub use producer::PathProducer;

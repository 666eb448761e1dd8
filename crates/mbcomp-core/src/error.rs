//! Processor error types
//!
//! These cover host-integration and configuration mistakes detected outside
//! the audio callback. The realtime path itself never returns errors.

use thiserror::Error;

/// Errors that can occur while setting up the processor or its parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessorError {
    /// Channel layout other than mono→mono or stereo→stereo
    #[error("Unsupported channel layout: {input} in, {output} out")]
    UnsupportedLayout { input: usize, output: usize },

    /// Sample rate must be positive and finite
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Block size must be at least one sample
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// No parameter with this display name
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Choice parameter index out of range
    #[error("Choice index {index} out of range for '{param}' ({count} choices)")]
    ChoiceOutOfRange {
        param: &'static str,
        index: usize,
        count: usize,
    },

    /// Parameter used with an accessor for a different kind
    #[error("Parameter '{param}' is not a {expected} parameter")]
    WrongParameterKind {
        param: &'static str,
        expected: &'static str,
    },
}

/// Result type for processor setup
pub type ProcessorResult<T> = Result<T, ProcessorError>;

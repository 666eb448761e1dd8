//! Configuration for the processor and the analyzer
//!
//! - Generic YAML config loading/saving
//! - Default config location
//! - Processor settings (gain ramp, channel sizes)
//! - Analyzer settings (FFT order, display range, path resolution)
//!
//! # Usage
//!
//! ```ignore
//! use mbcomp_core::config::{default_config_path, load_config, save_config, MbCompConfig};
//!
//! let path = default_config_path("mbcomp.yaml");
//! let config: MbCompConfig = load_config(&path);
//! save_config(&config, &path)?;
//! ```

mod analyzer;
mod io;
mod paths;
mod processor;

pub use analyzer::{AnalyzerConfig, FftOrder};
pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
pub use processor::ProcessorConfig;

use serde::{Deserialize, Serialize};

/// Top-level config file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MbCompConfig {
    pub processor: ProcessorConfig,
    pub analyzer: AnalyzerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let yaml = "analyzer:\n  fft_order: Order8192\n";
        let config: MbCompConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.analyzer.fft_order, FftOrder::Order8192);
        assert_eq!(config.analyzer.path_resolution, 2);
        assert_eq!(config.processor, ProcessorConfig::default());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mbcomp.yaml");

        let mut config = MbCompConfig::default();
        config.processor.gain_ramp_seconds = 0.02;
        config.analyzer.negative_infinity_db = -48.0;

        save_config(&config, &path).unwrap();
        let loaded: MbCompConfig = load_config(&path);
        assert_eq!(loaded, config);
    }
}

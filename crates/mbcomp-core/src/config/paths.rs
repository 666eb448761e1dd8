//! Standard location of the mbcomp config file

use std::path::PathBuf;

/// Get the default config directory
///
/// Returns: `<platform config dir>/mbcomp` (e.g. `~/.config/mbcomp`), or
/// `./mbcomp` when the platform has no config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mbcomp")
}

/// Get the default path for a config file
///
/// Returns: `<default_config_dir>/{filename}`
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}

//! Configuration file resolution
//!
//! Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`<config_dir>/<app_name>/config.toml`)
//! 4. None: the caller falls back to built-in defaults

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up inside the per-user configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Where a resolved configuration path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserConfigDir,
}

/// Resolve the configuration file to load, if any
///
/// Explicit paths (CLI or environment) are returned even when the file does
/// not exist so that the caller can report the problem; the per-user default
/// is only returned when it exists.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_name: &str,
) -> Option<(PathBuf, ConfigSource)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some((path.to_path_buf(), ConfigSource::CommandLine));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some((PathBuf::from(path), ConfigSource::Environment));
        }
    }

    // Priority 3: Per-user config directory
    if let Some(path) = default_config_path(app_name) {
        if path.exists() {
            return Some((path, ConfigSource::UserConfigDir));
        }
        debug!("No config file at {}", path.display());
    }

    None
}

/// Get the per-user configuration file path for the platform
///
/// - Linux: `~/.config/<app>/config.toml`
/// - macOS: `~/Library/Application Support/<app>/config.toml`
/// - Windows: `%APPDATA%\<app>\config.toml`
pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(app_name).join(CONFIG_FILE_NAME))
}

/// Read a configuration file into a string
///
/// A missing file is `Ok(None)`; any other I/O failure is a config error.
pub fn read_config_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Config(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

//! Configuration for preview-xfade
//!
//! A single optional TOML file. Every key has a built-in default, so an absent
//! file (or an absent section) is equivalent to:
//!
//! ```toml
//! event_capacity = 256
//!
//! [fade]
//! duration_ms = 400
//! tick_ms = 40
//! curve = "linear"
//! reset_position_on_stop = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Settings Sources Priority
//!
//! 1. `--config` command-line argument
//! 2. `PREVIEW_XFADE_CONFIG` environment variable
//! 3. `<config_dir>/preview-xfade/config.toml`
//! 4. Built-in defaults

use crate::{Error, Result};
use preview_common::config::{read_config_file, resolve_config_path};
use preview_common::FadeCurve;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application name used for the per-user config directory
pub const APP_NAME: &str = "preview-xfade";

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PREVIEW_XFADE_CONFIG";

/// Root of the TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Buffer size of the event broadcast channel
    pub event_capacity: usize,
    pub fade: FadeConfig,
    pub logging: LoggingConfig,
}

/// `[fade]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Length of a full 0.0 → 1.0 (or 1.0 → 0.0) fade
    pub duration_ms: u64,
    /// Interval between volume steps
    pub tick_ms: u64,
    /// Shaping applied to the ramp level before it reaches the resource
    pub curve: FadeCurve,
    /// Rewind to the start after a completed fade-out (false: pause in place)
    pub reset_position_on_stop: bool,
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
            fade: FadeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 400,
            tick_ms: 40,
            curve: FadeCurve::Linear,
            reset_position_on_stop: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; defaults used
    Missing(PathBuf),
    /// No file configured anywhere; defaults used
    Defaults,
}

/// Validated fade timing handed to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub fade_duration: Duration,
    pub tick_interval: Duration,
    pub curve: FadeCurve,
    pub reset_position_on_stop: bool,
}

impl Default for FadeSettings {
    fn default() -> Self {
        FadeConfig::default().settings()
    }
}

impl FadeConfig {
    pub fn settings(&self) -> FadeSettings {
        FadeSettings {
            fade_duration: Duration::from_millis(self.duration_ms),
            tick_interval: Duration::from_millis(self.tick_ms),
            curve: self.curve,
            reset_position_on_stop: self.reset_position_on_stop,
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve, read and validate the configuration file
    ///
    /// A configured path that does not exist yields defaults; an unreadable
    /// or invalid file is an error.
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        let Some((path, source)) = resolve_config_path(cli_path, CONFIG_ENV_VAR, APP_NAME)
        else {
            return Ok((Self::default(), ConfigOrigin::Defaults));
        };
        debug!("Config file {} (from {:?})", path.display(), source);

        match read_config_file(&path)? {
            Some(content) => {
                let config = Self::from_toml_str(&content).map_err(|e| {
                    Error::Config(format!("{}: {}", path.display(), e))
                })?;
                Ok((config, ConfigOrigin::File(path)))
            }
            None => Ok((Self::default(), ConfigOrigin::Missing(path))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fade.tick_ms == 0 {
            return Err(Error::Config("fade.tick_ms must be greater than 0".to_string()));
        }
        if self.fade.duration_ms == 0 {
            return Err(Error::Config(
                "fade.duration_ms must be greater than 0".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let settings = config.fade.settings();

        assert_eq!(settings.fade_duration, Duration::from_millis(400));
        assert_eq!(settings.tick_interval, Duration::from_millis(40));
        assert_eq!(settings.curve, FadeCurve::Linear);
        assert!(settings.reset_position_on_stop);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.event_capacity, 256);
        assert_eq!(settings, FadeSettings::default());
    }

    #[test]
    fn test_partial_fade_section() {
        let config = TomlConfig::from_toml_str(
            r#"
            [fade]
            duration_ms = 600
            curve = "s_curve"
            "#,
        )
        .unwrap();

        assert_eq!(config.fade.duration_ms, 600);
        assert_eq!(config.fade.tick_ms, 40);
        assert_eq!(config.fade.curve, FadeCurve::SCurve);
    }

    #[test]
    fn test_curve_aliases_accepted() {
        let config = TomlConfig::from_toml_str("[fade]\ncurve = \"cosine\"").unwrap();
        assert_eq!(config.fade.curve, FadeCurve::SCurve);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let result = TomlConfig::from_toml_str("[fade]\ntick_ms = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = TomlConfig::from_toml_str("[fade]\nduration_ms = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_curve_is_parse_error() {
        let result = TomlConfig::from_toml_str("[fade]\ncurve = \"wobbly\"");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fade]\ntick_ms = 20\nreset_position_on_stop = false").unwrap();

        let (config, origin) = TomlConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.fade.tick_ms, 20);
        assert!(!config.fade.reset_position_on_stop);
        assert_eq!(origin, ConfigOrigin::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing_explicit_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let (config, origin) = TomlConfig::load(Some(&path)).unwrap();
        assert_eq!(config.fade.duration_ms, 400);
        assert_eq!(origin, ConfigOrigin::Missing(path));
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fade]\ntick_ms = \"fast\"").unwrap();

        let err = TomlConfig::load(Some(file.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&file.path().display().to_string()));
    }
}

//! Error types for preview-xfade
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for preview-xfade
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed artist list
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// The controller loop has exited
    #[error("Preview controller is no longer running")]
    ControllerClosed,

    /// Errors surfaced from the shared crate
    #[error(transparent)]
    Common(#[from] preview_common::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using preview-xfade Error
pub type Result<T> = std::result::Result<T, Error>;

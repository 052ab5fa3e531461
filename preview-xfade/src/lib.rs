//! # Hover Preview Crossfade Library (preview-xfade)
//!
//! Starts, fades in, fades out and stops short audio previews in response to
//! hover-enter / hover-leave signals from a list UI.
//!
//! **Architecture:** One controller task owns a registry of per-item audio
//! handles and a volume ramp scheduler. UI events, ramp ticks and playback
//! start outcomes all reach it through channels and are processed in order.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod playback;
pub mod report;

pub use error::{Error, Result};
pub use playback::{HandleSnapshot, PreviewController};

//! Platform audio primitive abstraction
//!
//! The controller never talks to an audio device directly. It owns one
//! [`AudioResource`] per item, obtained from an [`AudioBackend`], and uses
//! only the operations below.

pub mod rodio_backend;
#[cfg(test)]
pub(crate) mod test_support;

pub use rodio_backend::RodioBackend;

use futures::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

/// Why a preview could not start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The clip could not be fetched or read
    #[error("failed to load preview: {0}")]
    Load(String),

    /// The clip was fetched but is not decodable audio
    #[error("failed to decode preview: {0}")]
    Decode(String),

    /// The platform refused to start output (device gone, policy, ...)
    #[error("playback declined: {0}")]
    Declined(String),

    /// The resource was released while the start was pending
    #[error("resource released")]
    Released,
}

/// One playable preview clip, exclusively owned by a single audio handle
///
/// All methods except `play` take effect synchronously. `play` returns a
/// future that resolves once output has actually started, or with the reason
/// it could not; the future must not borrow the resource.
pub trait AudioResource: Send {
    /// Bind the resource to its clip. Called exactly once, before any other
    /// operation; actual fetching may be deferred to the first `play`.
    fn load(&mut self, url: &str);

    /// Begin (or resume) output
    fn play(&mut self) -> BoxFuture<'static, Result<(), PlaybackError>>;

    /// Halt output, keeping the position. Wins over a still-pending `play`.
    fn pause(&mut self);

    /// Set the output volume, 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);

    /// Move the playback position
    fn set_position(&mut self, position: Duration);

    /// Stop output and free the clip. Further calls are no-ops.
    fn release(&mut self);
}

/// Factory for audio resources
pub trait AudioBackend: Send + Sync {
    /// Create an unloaded resource
    fn create(&self) -> Box<dyn AudioResource>;
}

//! # Preview Common Library
//!
//! Shared code for the hover-preview crates including:
//! - Item identity and handle lifecycle states
//! - Event types (PreviewEvent enum) and the EventBus
//! - Configuration file resolution
//! - Fade curve definitions and calculations

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;

pub use error::{Error, Result};
pub use events::{EventBus, HandleState, ItemId, PreviewEvent, RampDirection};
pub use fade_curves::FadeCurve;

//! Preview playback: ramp scheduling, handle registry and the controller

pub mod controller;
pub mod ramp;
pub mod registry;

pub use controller::{HandleSnapshot, PreviewController};
pub use ramp::{RampOperation, RampProgress, RampScheduler, RampTick, RampToken};
pub use registry::{AudioHandle, HandleRegistry};

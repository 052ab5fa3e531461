//! Preview-related type definitions
//!
//! Supporting types for item identity and the per-item handle lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a list item, unique within the active list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Audio handle lifecycle state
///
/// ```text
/// Idle ──play──▶ FadingIn ──ramp done──▶ Playing
///                  │  ▲                    │
///                stop play               stop
///                  ▼  │                    ▼
/// Stopped ◀──ramp done── FadingOut ◀───────┘
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum HandleState {
    /// Created, never played
    Idle,
    /// Volume ramping towards 1.0
    FadingIn,
    /// Full volume, no ramp running
    Playing,
    /// Volume ramping towards 0.0, resource still playing
    FadingOut,
    /// Paused after a completed fade-out or a failed start
    Stopped,
}

impl HandleState {
    /// True while the underlying resource is (or is about to be) audible
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            HandleState::FadingIn | HandleState::Playing | HandleState::FadingOut
        )
    }
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Idle => write!(f, "Idle"),
            HandleState::FadingIn => write!(f, "FadingIn"),
            HandleState::Playing => write!(f, "Playing"),
            HandleState::FadingOut => write!(f, "FadingOut"),
            HandleState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Direction of a volume ramp
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum RampDirection {
    /// Towards full volume (1.0)
    In,
    /// Towards silence (0.0)
    Out,
}

impl RampDirection {
    /// Volume this direction ends at
    pub fn target_volume(&self) -> f32 {
        match self {
            RampDirection::In => 1.0,
            RampDirection::Out => 0.0,
        }
    }
}

impl fmt::Display for RampDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampDirection::In => write!(f, "In"),
            RampDirection::Out => write!(f, "Out"),
        }
    }
}

//! Fade curve shaping for preview volume ramps
//!
//! A ramp moves a linear *level* in [0.0, 1.0] by fixed steps. Before the
//! level reaches the audio resource it is shaped by one of the curves below.
//! Every curve maps 0.0 to 0.0 and 1.0 to 1.0 and is monotone in between, so
//! a level that never overshoots produces an applied volume that never
//! overshoots either.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

/// Fade curve types
///
/// Each curve type provides a different perceptual quality:
/// - Linear: Constant rate of change (level is applied unchanged)
/// - Exponential: Slow start, fast finish
/// - Logarithmic: Fast start, slow finish
/// - SCurve: Smooth acceleration and deceleration
/// - EqualPower: Constant perceived loudness when two previews overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// v(l) = l
    #[default]
    Linear,

    /// v(l) = l²
    Exponential,

    /// v(l) = √l
    Logarithmic,

    /// v(l) = 0.5 × (1 - cos(π × l))
    #[serde(alias = "cosine", alias = "scurve", alias = "s-curve")]
    SCurve,

    /// v(l) = sin(l × π/2)
    #[serde(alias = "equalpower")]
    EqualPower,
}

impl FadeCurve {
    /// Map a ramp level onto the volume written to the resource
    ///
    /// The level is clamped to [0.0, 1.0] first.
    pub fn apply(&self, level: f32) -> f32 {
        let l = level.clamp(0.0, 1.0);

        let shaped = match self {
            FadeCurve::Linear => l,
            FadeCurve::Exponential => l * l,
            FadeCurve::Logarithmic => l.sqrt(),
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * l).cos()),
            FadeCurve::EqualPower => (l * FRAC_PI_2).sin(),
        };

        // Trig rounding can land a hair outside the unit interval at the ends
        shaped.clamp(0.0, 1.0)
    }

    /// Canonical lowercase name, as accepted in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FadeCurve {
    type Err = crate::Error;

    /// Accepts the canonical names plus the common aliases
    /// (`cosine`, `scurve`, `s-curve`, `equalpower`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(FadeCurve::Linear),
            "exponential" => Ok(FadeCurve::Exponential),
            "logarithmic" => Ok(FadeCurve::Logarithmic),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Ok(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Ok(FadeCurve::EqualPower),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown fade curve '{}'",
                other
            ))),
        }
    }
}

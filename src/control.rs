//! Control method selection and the per-method active input set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanoramaError;

/// Which input sources drive the camera. Host-settable at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMethod {
    Motion,
    #[default]
    Touch,
    Both,
}

impl ControlMethod {
    pub const ALL: [ControlMethod; 3] = [ControlMethod::Motion, ControlMethod::Touch, ControlMethod::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlMethod::Motion => "motion",
            ControlMethod::Touch => "touch",
            ControlMethod::Both => "both",
        }
    }
}

impl fmt::Display for ControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMethod {
    type Err = PanoramaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motion" => Ok(ControlMethod::Motion),
            "touch" => Ok(ControlMethod::Touch),
            "both" => Ok(ControlMethod::Both),
            other => Err(PanoramaError::InvalidConfig(format!(
                "unknown control method {other:?} (expected motion, touch or both)"
            ))),
        }
    }
}

/// Touch bias applied on top of sensor attitude in `Both` mode.
///
/// `x` accumulates vertical drag (pitch about X), `y` horizontal drag
/// (yaw about Y).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchOffset {
    pub x: f64,
    pub y: f64,
}

impl TouchOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn accumulate(&mut self, x_radians: f64, y_radians: f64) {
        self.x += x_radians;
        self.y += y_radians;
    }
}

/// Active input set with the state that only exists for it.
///
/// Always built fresh from a [`ControlMethod`], so switching methods
/// can never carry stale accumulators across.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Motion,
    Touch,
    Both(TouchOffset),
}

impl InputMode {
    pub fn method(&self) -> ControlMethod {
        match self {
            InputMode::Motion => ControlMethod::Motion,
            InputMode::Touch => ControlMethod::Touch,
            InputMode::Both(_) => ControlMethod::Both,
        }
    }

    pub fn accepts_motion(&self) -> bool {
        matches!(self, InputMode::Motion | InputMode::Both(_))
    }

    pub fn accepts_touch(&self) -> bool {
        matches!(self, InputMode::Touch | InputMode::Both(_))
    }

    pub fn touch_offset(&self) -> Option<TouchOffset> {
        match self {
            InputMode::Both(offset) => Some(*offset),
            _ => None,
        }
    }

    pub fn touch_offset_mut(&mut self) -> Option<&mut TouchOffset> {
        match self {
            InputMode::Both(offset) => Some(offset),
            _ => None,
        }
    }

    /// Zero the accumulators without leaving the current method.
    pub fn reset(&mut self) {
        if let InputMode::Both(offset) = self {
            *offset = TouchOffset::ZERO;
        }
    }
}

impl From<ControlMethod> for InputMode {
    fn from(method: ControlMethod) -> Self {
        match method {
            ControlMethod::Motion => InputMode::Motion,
            ControlMethod::Touch => InputMode::Touch,
            ControlMethod::Both => InputMode::Both(TouchOffset::ZERO),
        }
    }
}

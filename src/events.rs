//! Input vocabulary fed to the fusion engine by the host.

use glam::DQuat;
use serde::{Deserialize, Serialize};

use crate::orientation::ScreenOrientation;

/// Raw sensor attitude, tagged with the screen orientation at sample time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSample {
    pub attitude: DQuat,
    pub screen: ScreenOrientation,
}

impl AttitudeSample {
    pub fn new(attitude: DQuat, screen: ScreenOrientation) -> Self {
        Self { attitude, screen }
    }
}

/// Pixel delta since the previous drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragDelta {
    pub dx: f64,
    pub dy: f64,
}

impl DragDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl std::ops::Neg for DragDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

/// `scale` is cumulative since the gesture began (1.0 = unchanged).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub scale: f64,
    pub phase: GesturePhase,
}

/// `delta_radians` is the change since the previous rotation event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationGesture {
    pub delta_radians: f64,
    pub phase: GesturePhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Attitude(AttitudeSample),
    Drag(DragDelta),
    Pinch(PinchGesture),
    Rotation(RotationGesture),
    Tap(TapEvent),
}

/// View size in pixels. Both sides must be > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f64,
    pub height: f64,
}

impl ViewSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(self) -> f64 {
        self.width / self.height
    }
}

/// Per-axis drag multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanSpeed {
    pub x: f64,
    pub y: f64,
}

impl PanSpeed {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for PanSpeed {
    fn default() -> Self {
        Self { x: 0.4, y: 0.4 }
    }
}

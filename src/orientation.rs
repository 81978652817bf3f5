//! Camera orientation and the sensor-to-screen axis remap.
//!
//! The camera looks down -Z with +Y up. Device attitude arrives in the
//! sensor's reference frame (Z vertical); [`ScreenOrientation::remap`]
//! brings it into camera space for whichever way the screen is held.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DQuat, DVec3, EulerRot};
use once_cell::sync::Lazy;

/// Unit quaternion for the camera rotation relative to the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation(DQuat);

impl Orientation {
    pub const IDENTITY: Self = Self(DQuat::IDENTITY);

    /// Normalizes on the way in.
    pub fn new(q: DQuat) -> Self {
        Self(q.normalize())
    }

    /// Yaw-only rotation about the vertical axis.
    pub fn from_yaw(radians: f64) -> Self {
        Self(DQuat::from_rotation_y(radians))
    }

    pub fn quat(self) -> DQuat {
        self.0
    }

    /// Signed yaw: `-atan2(2(y·w - x·z), 1 - 2(y² + z²))`.
    ///
    /// This is the angle reported to compass and host callbacks.
    pub fn camera_angle(self) -> f64 {
        let q = self.0;
        let yaw = (2.0 * (q.y * q.w - q.x * q.z)).atan2(1.0 - 2.0 * (q.y * q.y + q.z * q.z));
        -yaw
    }

    /// (pitch, yaw, roll) in degrees, yaw about Y applied first.
    pub fn euler_degrees(self) -> (f64, f64, f64) {
        let (yaw, pitch, roll) = self.0.to_euler(EulerRot::YXZ);
        (pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
    }

    /// Same rotation, ignoring the q / -q sign ambiguity.
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        self.0.abs_diff_eq(other.0, tolerance) || self.0.abs_diff_eq(-other.0, tolerance)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: Axis,
    pub radians: f64,
}

impl AxisAngle {
    pub const fn new(axis: Axis, radians: f64) -> Self {
        Self { axis, radians }
    }

    pub fn quat(self) -> DQuat {
        DQuat::from_axis_angle(self.axis.unit(), self.radians)
    }
}

/// Which way up the screen is being held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Per-orientation remap: corrections are left-multiplied in order, then
/// the result is re-expressed in screen axes by conjugating with a
/// rotation of `frame_roll` about Z.
#[derive(Debug, Clone, Copy)]
pub struct AxisRemap {
    pub corrections: &'static [AxisAngle],
    pub frame_roll: f64,
}

const TO_CAMERA: AxisAngle = AxisAngle::new(Axis::X, -FRAC_PI_2);

const REMAP_TABLE: [AxisRemap; 4] = [
    // Portrait
    AxisRemap {
        corrections: &[TO_CAMERA],
        frame_roll: 0.0,
    },
    // PortraitUpsideDown
    AxisRemap {
        corrections: &[TO_CAMERA, AxisAngle::new(Axis::Z, PI)],
        frame_roll: PI,
    },
    // LandscapeLeft
    AxisRemap {
        corrections: &[AxisAngle::new(Axis::Y, -FRAC_PI_2), TO_CAMERA],
        frame_roll: -FRAC_PI_2,
    },
    // LandscapeRight
    AxisRemap {
        corrections: &[AxisAngle::new(Axis::Y, FRAC_PI_2), TO_CAMERA],
        frame_roll: FRAC_PI_2,
    },
];

/// (pre-multiplier, frame rotation) per orientation, folded once.
static REMAP_QUATS: Lazy<[(DQuat, DQuat); 4]> = Lazy::new(|| {
    REMAP_TABLE.map(|remap| {
        let pre = remap
            .corrections
            .iter()
            .fold(DQuat::IDENTITY, |acc, c| c.quat() * acc);
        (pre, DQuat::from_rotation_z(remap.frame_roll))
    })
});

impl ScreenOrientation {
    pub const ALL: [ScreenOrientation; 4] = [
        ScreenOrientation::Portrait,
        ScreenOrientation::PortraitUpsideDown,
        ScreenOrientation::LandscapeLeft,
        ScreenOrientation::LandscapeRight,
    ];

    fn index(self) -> usize {
        match self {
            ScreenOrientation::Portrait => 0,
            ScreenOrientation::PortraitUpsideDown => 1,
            ScreenOrientation::LandscapeLeft => 2,
            ScreenOrientation::LandscapeRight => 3,
        }
    }

    pub fn table_entry(self) -> AxisRemap {
        REMAP_TABLE[self.index()]
    }

    /// Map a raw sensor attitude into camera space for this screen orientation.
    pub fn remap(self, attitude: DQuat) -> DQuat {
        let (pre, frame) = REMAP_QUATS[self.index()];
        let q = pre * attitude;
        (frame * q * frame.conjugate()).normalize()
    }
}

//! Movement reports and the gate deciding when observers hear about them.

use std::f64::consts::TAU;

/// Snapshot delivered to compass / host callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementReport {
    /// Camera angle in degrees (see `Orientation::camera_angle`).
    pub yaw_degrees: f64,
    /// Horizontal field of view in radians.
    pub fov_radians: f64,
    pub pitch_degrees: f64,
    pub roll_degrees: f64,
}

/// Host callbacks, all no-ops by default.
pub trait FusionObserver {
    /// Every report, resets and layout changes included.
    fn compass_updated(&mut self, _report: &MovementReport) {}
    /// Camera movement that passed the [`ReportGate`].
    fn orientation_changed(&mut self, _report: &MovementReport) {}
    fn tapped(&mut self, _world_angle_degrees: f64) {}
}

/// Notify only when yaw or FoV moved by at least `epsilon_degrees`.
#[derive(Debug, Clone)]
pub struct ReportGate {
    epsilon_degrees: f64,
    last: Option<MovementReport>,
}

impl ReportGate {
    pub fn new(epsilon_degrees: f64) -> Self {
        Self {
            epsilon_degrees,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&MovementReport> {
        self.last.as_ref()
    }

    /// Returns true (and remembers `report`) if it should be delivered.
    pub fn admit(&mut self, report: MovementReport) -> bool {
        let changed = match &self.last {
            None => true,
            Some(prev) => {
                angular_distance_degrees(prev.yaw_degrees, report.yaw_degrees) >= self.epsilon_degrees
                    || (prev.fov_radians - report.fov_radians).abs() >= self.epsilon_degrees.to_radians()
            }
        };
        if changed {
            self.last = Some(report);
        }
        changed
    }

    /// Record without gating; later moves are measured from here.
    pub fn force(&mut self, report: MovementReport) {
        self.last = Some(report);
    }
}

/// Shortest distance between two angles, in degrees, in [0, 180].
pub fn angular_distance_degrees(a: f64, b: f64) -> f64 {
    let d = (a - b).to_radians().rem_euclid(TAU);
    d.min(TAU - d).to_degrees()
}

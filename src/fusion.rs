//! Stateless orientation math. The engine composes these; every function
//! is total over finite inputs and preconditions (view size > 0, scale > 0).

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DMat3, DQuat};

use crate::control::TouchOffset;
use crate::events::{AttitudeSample, DragDelta, PanSpeed, ViewSize};
use crate::fov::{FieldOfView, FovBounds};
use crate::orientation::Orientation;
use crate::panorama::ProjectionMode;

/// A drag across the full view width turns the camera once.
pub const MAX_PAN_ROTATION: f64 = TAU;

/// Pitch about camera X first, then yaw about world Y.
pub fn compose_touch(q: DQuat, x_radians: f64, y_radians: f64) -> DQuat {
    DQuat::from_rotation_y(y_radians) * (q * DQuat::from_rotation_x(x_radians))
}

/// Spherical attitude: remap for the screen, then bias by touch in `Both`.
pub fn fuse_attitude(sample: &AttitudeSample, offset: Option<TouchOffset>) -> Orientation {
    let q = sample.screen.remap(sample.attitude);
    match offset {
        Some(offset) => Orientation::new(compose_touch(q, offset.x, offset.y)),
        None => Orientation::new(q),
    }
}

/// Heading from row 3 of the reference-to-device attitude matrix:
/// `π − atan2(m32, m31) + π/2`.
pub fn cylindrical_heading(attitude: DQuat) -> f64 {
    let m = DMat3::from_quat(attitude).transpose();
    let m31 = m.x_axis.z;
    let m32 = m.y_axis.z;
    PI - m32.atan2(m31) + FRAC_PI_2
}

/// Cylindrical attitude: yaw only, pitch and roll dropped.
pub fn cylindrical_attitude(sample: &AttitudeSample, start_angle: f64, offset: Option<TouchOffset>) -> Orientation {
    let mut yaw = start_angle;
    if let Some(offset) = offset {
        yaw += offset.y;
    }
    Orientation::from_yaw(yaw - cylindrical_heading(sample.attitude))
}

/// Drag delta in pixels to (x_radians, y_radians): vertical drag pitches,
/// horizontal drag yaws.
pub fn drag_radians(delta: DragDelta, view: ViewSize, pan_speed: PanSpeed, projection: ProjectionMode) -> (f64, f64) {
    let speed_y = if projection.allows_vertical() { pan_speed.y } else { 0.0 };
    let y_radians = delta.dx * pan_speed.x / view.width * MAX_PAN_ROTATION;
    let x_radians = delta.dy * speed_y / view.height * MAX_PAN_ROTATION;
    (x_radians, y_radians)
}

pub fn apply_drag(
    q: Orientation,
    delta: DragDelta,
    view: ViewSize,
    pan_speed: PanSpeed,
    projection: ProjectionMode,
) -> Orientation {
    let (x, y) = drag_radians(delta, view, pan_speed, projection);
    Orientation::new(compose_touch(q.quat(), x, y))
}

/// `start / scale` if it lands inside `bounds`, otherwise `current`.
pub fn apply_pinch(current: FieldOfView, scale: f64, start: FieldOfView, bounds: FovBounds) -> FieldOfView {
    let fov = start.degrees() / scale;
    if bounds.accepts(fov) {
        FieldOfView(fov)
    } else {
        current
    }
}

/// Roll about the camera's viewing axis. Cylindrical panoramas have no roll.
pub fn apply_roll(q: Orientation, delta_radians: f64, projection: ProjectionMode) -> Orientation {
    if !projection.allows_roll() {
        return q;
    }
    Orientation::new(q.quat() * DQuat::from_rotation_z(delta_radians))
}

/// World angle (degrees) under a tap at `tap_x`.
pub fn pixel_to_angle(tap_x: f64, view_width: f64, camera_yaw_degrees: f64, horizontal_fov_degrees: f64) -> f64 {
    let percentage = tap_x / view_width;
    let angle_to_add = horizontal_fov_degrees * percentage;
    let start_angle = camera_yaw_degrees.abs() - horizontal_fov_degrees / 2.0;
    start_angle + angle_to_add
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::ScreenOrientation;
    use glam::{DVec3, EulerRot};

    const EPSILON: f64 = 1e-9;

    fn view() -> ViewSize {
        ViewSize::new(800.0, 600.0)
    }

    #[test]
    fn attitude_fusion_keeps_unit_norm() {
        let attitudes = [
            DQuat::IDENTITY,
            DQuat::from_euler(EulerRot::ZXY, 0.3, 1.2, -2.0),
            DQuat::from_euler(EulerRot::XYZ, -3.0, 0.1, 2.9),
        ];
        let offsets = [None, Some(TouchOffset { x: 0.7, y: -4.1 })];
        for attitude in attitudes {
            for screen in ScreenOrientation::ALL {
                for offset in offsets {
                    let q = fuse_attitude(&AttitudeSample::new(attitude, screen), offset).quat();
                    assert!((q.length() - 1.0).abs() < 1e-6, "{screen:?} {offset:?}");
                }
            }
        }
    }

    #[test]
    fn both_mode_bias_matches_touch_composition() {
        let sample = AttitudeSample::new(DQuat::from_rotation_x(FRAC_PI_2), ScreenOrientation::Portrait);
        let offset = TouchOffset { x: 0.25, y: 1.5 };
        let fused = fuse_attitude(&sample, Some(offset));
        let by_touch = apply_drag(
            Orientation::IDENTITY,
            DragDelta::new(1.5 / TAU * 800.0, 0.25 / TAU * 600.0),
            view(),
            PanSpeed::new(1.0, 1.0),
            ProjectionMode::Spherical,
        );
        assert!(fused.approx_eq(by_touch, EPSILON));
    }

    #[test]
    fn cylindrical_heading_tracks_device_heading() {
        let start = 0.3;
        for heading in [-2.5, -0.4, 0.0, 0.9, 3.0] {
            let attitude = DQuat::from_rotation_z(heading) * DQuat::from_rotation_x(FRAC_PI_2);
            let sample = AttitudeSample::new(attitude, ScreenOrientation::Portrait);
            let cyl = cylindrical_attitude(&sample, start, None);
            let sph = fuse_attitude(&sample, None);
            // Same yaw as the spherical path, shifted by the start angle.
            let expected = Orientation::new(DQuat::from_rotation_y(start) * sph.quat());
            assert!(cyl.approx_eq(expected, 1e-9), "heading {heading}");
        }
    }

    #[test]
    fn cylindrical_drops_pitch_and_roll() {
        let attitude = DQuat::from_rotation_z(0.5) * DQuat::from_rotation_x(FRAC_PI_2 + 0.4) * DQuat::from_rotation_y(0.2);
        let sample = AttitudeSample::new(attitude, ScreenOrientation::LandscapeLeft);
        let q = cylindrical_attitude(&sample, 0.0, Some(TouchOffset { x: 1.0, y: 0.2 })).quat();
        assert!(q.x.abs() < EPSILON && q.z.abs() < EPSILON);
        // The camera's up vector stays vertical.
        assert!((q * DVec3::Y).abs_diff_eq(DVec3::Y, EPSILON));
    }

    #[test]
    fn half_width_drag_is_a_half_turn() {
        for speed_y in [0.0, 0.4, 3.0] {
            let q = apply_drag(
                Orientation::IDENTITY,
                DragDelta::new(400.0, 0.0),
                view(),
                PanSpeed::new(1.0, speed_y),
                ProjectionMode::Spherical,
            );
            assert!(q.approx_eq(Orientation::from_yaw(PI), EPSILON));
            assert!((q.quat() * DVec3::NEG_Z).abs_diff_eq(DVec3::Z, EPSILON));
        }
    }

    #[test]
    fn cylindrical_drag_ignores_vertical() {
        let (x, y) = drag_radians(DragDelta::new(80.0, 300.0), view(), PanSpeed::new(1.0, 1.0), ProjectionMode::Cylindrical);
        assert_eq!(x, 0.0);
        assert!((y - 0.1 * TAU).abs() < EPSILON);
    }

    #[test]
    fn drag_then_reverse_restores_orientation() {
        let start = Orientation::new(DQuat::from_euler(EulerRot::YXZ, 0.4, -0.3, 0.1));
        let delta = DragDelta::new(123.0, -57.0);
        let speed = PanSpeed::default();
        let moved = apply_drag(start, delta, view(), speed, ProjectionMode::Spherical);
        assert!(!moved.approx_eq(start, 1e-3));
        let back = apply_drag(moved, -delta, view(), speed, ProjectionMode::Spherical);
        assert!(back.approx_eq(start, 1e-6));
    }

    #[test]
    fn composition_order_is_pitch_local_yaw_world() {
        // Tilt up, then yaw: the camera's up vector must still lean toward
        // world Y after a world-frame yaw.
        let tilted = Orientation::new(DQuat::from_rotation_x(0.6));
        let q = apply_drag(tilted, DragDelta::new(200.0, 0.0), view(), PanSpeed::new(1.0, 1.0), ProjectionMode::Spherical);
        let up = q.quat() * DVec3::Y;
        assert!((up.y - 0.6f64.cos()).abs() < EPSILON);
    }

    #[test]
    fn pinch_accepts_inside_bounds() {
        let bounds = FovBounds::new(40.0, 100.0);
        let got = apply_pinch(FieldOfView(70.0), 1.0, FieldOfView(70.0), bounds);
        assert_eq!(got, FieldOfView(70.0));
        let got = apply_pinch(FieldOfView(70.0), 1.4, FieldOfView(70.0), bounds);
        assert!((got.degrees() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn pinch_to_exact_minimum_is_rejected() {
        let bounds = FovBounds::new(40.0, 100.0);
        let got = apply_pinch(FieldOfView(80.0), 2.0, FieldOfView(80.0), bounds);
        assert_eq!(got, FieldOfView(80.0));
        let got = apply_pinch(FieldOfView(55.0), 2.0, FieldOfView(80.0), bounds);
        assert_eq!(got, FieldOfView(55.0));
    }

    #[test]
    fn pinch_to_exact_maximum_is_accepted() {
        let bounds = FovBounds::new(40.0, 100.0);
        let got = apply_pinch(FieldOfView(60.0), 0.5, FieldOfView(50.0), bounds);
        assert_eq!(got, FieldOfView(100.0));
        let got = apply_pinch(FieldOfView(60.0), 0.4, FieldOfView(50.0), bounds);
        assert_eq!(got, FieldOfView(60.0));
    }

    #[test]
    fn roll_is_identity_on_cylinder() {
        let q = Orientation::new(DQuat::from_euler(EulerRot::YXZ, 1.0, 0.2, 0.3));
        for delta in [-3.0, 0.0, 0.01, 2.5] {
            assert_eq!(apply_roll(q, delta, ProjectionMode::Cylindrical), q);
        }
    }

    #[test]
    fn roll_spins_about_view_axis() {
        let q = apply_roll(Orientation::IDENTITY, FRAC_PI_2, ProjectionMode::Spherical);
        // Forward unchanged, up rotated onto -X.
        assert!((q.quat() * DVec3::NEG_Z).abs_diff_eq(DVec3::NEG_Z, EPSILON));
        assert!((q.quat() * DVec3::Y).abs_diff_eq(DVec3::NEG_X, EPSILON));
    }

    #[test]
    fn tap_at_centre_maps_to_camera_yaw() {
        assert!(pixel_to_angle(400.0, 800.0, 0.0, 90.0).abs() < EPSILON);
        assert!((pixel_to_angle(400.0, 800.0, -30.0, 90.0) - 30.0).abs() < EPSILON);
        assert!((pixel_to_angle(0.0, 800.0, 0.0, 90.0) + 45.0).abs() < EPSILON);
        assert!((pixel_to_angle(800.0, 800.0, 0.0, 90.0) - 45.0).abs() < EPSILON);
    }
}

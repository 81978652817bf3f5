use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use glam::{DQuat, EulerRot};
use panorama_fusion::fusion;
use panorama_fusion::{
    AttitudeSample, ControlMethod, DragDelta, FieldOfView, FovBounds, FusionObserver, FusionSettings, GesturePhase,
    InputEvent, MotionFeed, MovementReport, Orientation, OrientationFusionEngine, PanSpeed, PinchGesture,
    ProjectionMode, RotationGesture, ScreenOrientation, ScriptedSource, TapEvent, TouchOffset, ViewSize,
    ViewerConfig,
};

const VIEW: ViewSize = ViewSize { width: 1000.0, height: 500.0 };

fn engine(method: ControlMethod) -> OrientationFusionEngine {
    let mut e = OrientationFusionEngine::new(FusionSettings::default(), method, ProjectionMode::Spherical);
    e.set_view_size(VIEW);
    e
}

fn upright(heading: f64) -> AttitudeSample {
    AttitudeSample::new(
        DQuat::from_rotation_z(heading) * DQuat::from_rotation_x(FRAC_PI_2),
        ScreenOrientation::Portrait,
    )
}

fn rotation(delta_radians: f64, phase: GesturePhase) -> InputEvent {
    InputEvent::Rotation(RotationGesture { delta_radians, phase })
}

#[test]
fn attitude_output_is_unit_norm_for_every_screen_orientation() {
    let mut e = engine(ControlMethod::Both);
    e.handle_drag(DragDelta::new(37.0, -81.0));
    for screen in ScreenOrientation::ALL {
        for (a, b, c) in [(0.0, 0.0, 0.0), (0.4, 1.3, -0.2), (-2.8, 0.9, 3.1)] {
            let sample = AttitudeSample::new(DQuat::from_euler(EulerRot::ZXY, a, b, c), screen);
            let q = e.handle_attitude(sample).unwrap().quat();
            assert!((q.length() - 1.0).abs() < 1e-6, "{screen:?}");
        }
    }
}

#[test]
fn half_width_drag_is_half_turn_regardless_of_vertical_speed() {
    for vertical in [0.0, 0.4, 10.0] {
        let mut e = engine(ControlMethod::Touch);
        e.set_pan_speed(PanSpeed::new(1.0, vertical));
        e.handle(InputEvent::Drag(DragDelta::new(VIEW.width / 2.0, 0.0)));
        assert!(e.orientation().approx_eq(Orientation::from_yaw(PI), 1e-9));
    }
}

#[test]
fn drag_and_inverse_drag_round_trip() {
    let mut e = engine(ControlMethod::Touch);
    e.handle_drag(DragDelta::new(210.0, 45.0));
    let before = e.orientation();
    e.handle_drag(DragDelta::new(-333.0, 120.0));
    e.handle_drag(DragDelta::new(333.0, -120.0));
    assert!(e.orientation().approx_eq(before, 1e-6));
}

#[test]
fn leaving_both_resets_accumulators_before_next_input() {
    let mut e = engine(ControlMethod::Both);
    e.handle_drag(DragDelta::new(100.0, 100.0));
    assert_ne!(e.touch_offset(), Some(TouchOffset::ZERO));

    e.set_control_method(ControlMethod::Motion);
    assert_eq!(e.touch_offset(), None);
    // A motion sample now sees no touch bias at all.
    let q = e.handle_attitude(upright(0.0)).unwrap();
    assert!(q.approx_eq(Orientation::IDENTITY, 1e-9));

    e.set_control_method(ControlMethod::Both);
    assert_eq!(e.touch_offset(), Some(TouchOffset::ZERO));
}

#[test]
fn pinch_boundary_policy() {
    let bounds = FovBounds::new(40.0, 100.0);
    assert_eq!(fusion::apply_pinch(FieldOfView(80.0), 2.0, FieldOfView(80.0), bounds), FieldOfView(80.0));
    assert_eq!(fusion::apply_pinch(FieldOfView(70.0), 1.0, FieldOfView(70.0), bounds), FieldOfView(70.0));
}

#[test]
fn rotation_gesture_is_identity_on_cylinder() {
    let mut e = OrientationFusionEngine::new(FusionSettings::default(), ControlMethod::Touch, ProjectionMode::Cylindrical);
    e.set_view_size(VIEW);
    e.handle_drag(DragDelta::new(120.0, 0.0));
    let before = e.orientation();
    for delta in [0.3, -2.0, 7.0] {
        e.handle(rotation(delta, GesturePhase::Began));
        e.handle(rotation(delta, GesturePhase::Changed));
        e.handle(rotation(delta, GesturePhase::Ended));
    }
    assert_eq!(e.orientation(), before);
}

#[test]
fn centre_tap_maps_to_camera_centre() {
    assert!(fusion::pixel_to_angle(VIEW.width / 2.0, VIEW.width, 0.0, 90.0).abs() < 1e-12);

    let mut e = engine(ControlMethod::Touch);
    e.set_pan_speed(PanSpeed::new(1.0, 1.0));
    // -1/8 of the width: 45° of camera angle.
    e.handle_drag(DragDelta::new(-VIEW.width / 8.0, 0.0));
    let angle = e.handle_tap(TapEvent { x: VIEW.width / 2.0, y: 10.0 });
    assert!((angle - 45.0).abs() < 1e-9);
}

#[test]
fn pinch_gesture_through_engine() {
    let mut e = engine(ControlMethod::Touch);
    let pinch = |scale, phase| InputEvent::Pinch(PinchGesture { scale, phase });
    e.handle(pinch(1.0, GesturePhase::Began));
    e.handle(pinch(2.0, GesturePhase::Changed));
    assert_eq!(e.fov(), FieldOfView(50.0));
    e.handle(pinch(2.0, GesturePhase::Ended));

    // A new gesture starts from the current FoV.
    e.handle(pinch(1.0, GesturePhase::Began));
    e.handle(pinch(0.5, GesturePhase::Changed));
    assert_eq!(e.fov(), FieldOfView(100.0));
}

#[test]
fn motion_is_paused_not_discarded_during_rotation() {
    let mut e = engine(ControlMethod::Both);
    e.handle(rotation(0.0, GesturePhase::Began));
    assert!(e.is_motion_paused());

    let samples = [upright(0.1), upright(0.2), upright(0.6)];
    let mut feed = MotionFeed::start(ScriptedSource::new(samples), Duration::from_millis(1)).unwrap();

    // Paused: the feed keeps overwriting its slot, nothing is consumed.
    let until = Instant::now() + Duration::from_millis(250);
    while Instant::now() < until {
        assert!(!e.pump_motion(&mut feed));
        thread::sleep(Duration::from_millis(5));
    }
    assert!(feed.has_pending());

    e.handle(rotation(0.2, GesturePhase::Changed));
    let (_, _, roll) = e.orientation().euler_degrees();
    assert!((roll - 0.2f64.to_degrees()).abs() < 1e-9);

    e.handle(rotation(0.0, GesturePhase::Ended));
    assert!(!e.is_motion_paused());
    assert!(e.pump_motion(&mut feed));
    // The newest sample wins (heading 0.6 -> camera angle -0.6).
    assert!((e.camera_angle() + 0.6).abs() < 1e-9);
    assert!(!feed.has_pending());
}

#[derive(Default)]
struct Log {
    reports: Vec<MovementReport>,
    taps: Vec<f64>,
}

struct Shared(Rc<RefCell<Log>>);

impl FusionObserver for Shared {
    fn orientation_changed(&mut self, report: &MovementReport) {
        self.0.borrow_mut().reports.push(*report);
    }

    fn tapped(&mut self, world_angle_degrees: f64) {
        self.0.borrow_mut().taps.push(world_angle_degrees);
    }
}

#[test]
fn observer_callbacks_from_config() {
    let config = ViewerConfig::from_json(r#"{ "control_method": "motion", "start_angle": 0.5, "report_epsilon_degrees": 1.0 }"#).unwrap();
    let mut e = OrientationFusionEngine::from_config(&config, ProjectionMode::Spherical);
    e.set_view_size(VIEW);
    let log = Rc::new(RefCell::new(Log::default()));
    e.set_observer(Box::new(Shared(Rc::clone(&log))));

    assert!(e.orientation().approx_eq(Orientation::from_yaw(0.5), 1e-12));

    e.handle_attitude(upright(0.3));
    e.handle_attitude(upright(0.305));
    e.handle_attitude(upright(0.4));
    let log = log.borrow();
    // 0.305 rad is within 1° of 0.3 rad; 0.4 is not.
    assert_eq!(log.reports.len(), 2);
    assert!((log.reports[1].yaw_degrees + 0.4f64.to_degrees()).abs() < 1e-9);
    assert!(log.taps.is_empty());
}

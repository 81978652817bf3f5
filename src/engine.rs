//! The orientation fusion engine: the single owner of camera orientation.
//!
//! Everything here runs on one serial context (the host's UI / render
//! thread). Motion samples produced elsewhere reach it through
//! [`MotionFeed`], never by touching engine state directly.

use crate::config::ViewerConfig;
use crate::control::{ControlMethod, InputMode, TouchOffset};
use crate::events::{
    AttitudeSample, DragDelta, GesturePhase, InputEvent, PanSpeed, PinchGesture, RotationGesture, TapEvent,
    ViewSize,
};
use crate::fov::{FieldOfView, FovBounds};
use crate::fusion;
use crate::motion::MotionFeed;
use crate::orientation::Orientation;
use crate::panorama::ProjectionMode;
use crate::report::{FusionObserver, MovementReport, ReportGate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionSettings {
    pub pan_speed: PanSpeed,
    pub fov_bounds: FovBounds,
    /// Reference yaw in radians.
    pub start_angle: f64,
    pub report_epsilon_degrees: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            pan_speed: PanSpeed::default(),
            fov_bounds: FovBounds::default(),
            start_angle: 0.0,
            report_epsilon_degrees: 0.5,
        }
    }
}

impl From<&ViewerConfig> for FusionSettings {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            pan_speed: config.pan_speed,
            fov_bounds: config.fov_bounds(),
            start_angle: config.start_angle,
            report_epsilon_degrees: config.report_epsilon_degrees,
        }
    }
}

pub struct OrientationFusionEngine {
    orientation: Orientation,
    fov: FieldOfView,
    projection: ProjectionMode,
    mode: InputMode,
    settings: FusionSettings,
    view: ViewSize,

    // Set on rotation Began, cleared on Ended/Cancelled.
    motion_paused: bool,
    pinch_start: Option<FieldOfView>,

    gate: ReportGate,
    observer: Option<Box<dyn FusionObserver>>,
}

impl OrientationFusionEngine {
    pub fn new(settings: FusionSettings, method: ControlMethod, projection: ProjectionMode) -> Self {
        let mut engine = Self {
            orientation: Orientation::IDENTITY,
            fov: FieldOfView(settings.fov_bounds.max),
            projection,
            mode: InputMode::from(method),
            settings,
            view: ViewSize::new(1.0, 1.0),
            motion_paused: false,
            pinch_start: None,
            gate: ReportGate::new(settings.report_epsilon_degrees),
            observer: None,
        };
        engine.reset_camera_angles();
        engine
    }

    pub fn from_config(config: &ViewerConfig, projection: ProjectionMode) -> Self {
        Self::new(FusionSettings::from(config), config.control_method, projection)
    }

    pub fn set_observer(&mut self, observer: Box<dyn FusionObserver>) {
        self.observer = Some(observer);
    }

    // --- accessors ---

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn fov(&self) -> FieldOfView {
        self.fov
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn control_method(&self) -> ControlMethod {
        self.mode.method()
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// `Some` only in `Both` mode.
    pub fn touch_offset(&self) -> Option<TouchOffset> {
        self.mode.touch_offset()
    }

    pub fn settings(&self) -> &FusionSettings {
        &self.settings
    }

    pub fn view_size(&self) -> ViewSize {
        self.view
    }

    pub fn is_motion_paused(&self) -> bool {
        self.motion_paused
    }

    /// Camera angle in radians, as reported to observers.
    pub fn camera_angle(&self) -> f64 {
        self.orientation.camera_angle()
    }

    pub fn horizontal_fov_degrees(&self) -> f64 {
        self.fov.horizontal_degrees(self.view.aspect())
    }

    pub fn last_report(&self) -> Option<&MovementReport> {
        self.gate.last()
    }

    pub fn current_report(&self) -> MovementReport {
        let (pitch, _, roll) = self.orientation.euler_degrees();
        MovementReport {
            yaw_degrees: self.camera_angle().to_degrees(),
            fov_radians: self.horizontal_fov_degrees().to_radians(),
            pitch_degrees: pitch,
            roll_degrees: roll,
        }
    }

    // --- host configuration ---

    /// Swap the active input set. Accumulators and camera angles reset.
    pub fn set_control_method(&mut self, method: ControlMethod) {
        log::debug!("control method {} -> {}", self.mode.method(), method);
        self.mode = InputMode::from(method);
        self.motion_paused = false;
        self.pinch_start = None;
        self.reset_camera_angles();
    }

    /// A new panorama was loaded.
    pub fn set_projection(&mut self, projection: ProjectionMode) {
        if projection != self.projection {
            log::debug!("projection {:?} -> {:?}", self.projection, projection);
        }
        self.projection = projection;
        if !projection.allows_vertical() {
            // Keep only the heading; a cylinder has no pitch or roll.
            self.orientation = Orientation::from_yaw(-self.camera_angle());
        }
    }

    /// Layout changed. Only the compass hears about it.
    pub fn set_view_size(&mut self, view: ViewSize) {
        self.view = view;
        self.publish(self.current_report(), false);
    }

    pub fn set_pan_speed(&mut self, pan_speed: PanSpeed) {
        self.settings.pan_speed = pan_speed;
    }

    pub fn set_fov_bounds(&mut self, bounds: FovBounds) {
        self.settings.fov_bounds = bounds;
        if !bounds.accepts(self.fov.degrees()) {
            self.fov = FieldOfView(bounds.max);
        }
    }

    pub fn set_start_angle(&mut self, radians: f64) {
        self.settings.start_angle = radians;
    }

    /// FoV back to max, yaw to the start angle, touch offsets to zero.
    pub fn reset_camera_angles(&mut self) {
        self.fov = FieldOfView(self.settings.fov_bounds.max);
        self.orientation = Orientation::from_yaw(self.settings.start_angle);
        self.mode.reset();
        log::debug!("camera reset (start angle {:.3} rad)", self.settings.start_angle);
        self.publish(self.current_report(), false);
    }

    // --- input ---

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Attitude(sample) => {
                self.handle_attitude(sample);
            }
            InputEvent::Drag(delta) => self.handle_drag(delta),
            InputEvent::Pinch(pinch) => self.handle_pinch(pinch),
            InputEvent::Rotation(rotation) => self.handle_rotation(rotation),
            InputEvent::Tap(tap) => {
                self.handle_tap(tap);
            }
        }
    }

    /// Returns the new orientation, or `None` if motion is not live.
    pub fn handle_attitude(&mut self, sample: AttitudeSample) -> Option<Orientation> {
        if !self.mode.accepts_motion() || self.motion_paused {
            return None;
        }
        let offset = self.mode.touch_offset();
        self.orientation = match self.projection {
            ProjectionMode::Spherical => fusion::fuse_attitude(&sample, offset),
            ProjectionMode::Cylindrical => fusion::cylindrical_attitude(&sample, self.settings.start_angle, offset),
        };
        log::trace!("attitude -> {:?}", self.orientation);
        self.report_movement();
        Some(self.orientation)
    }

    /// Apply the newest sample. Leaves it in the feed while paused.
    pub fn pump_motion(&mut self, feed: &mut MotionFeed) -> bool {
        if !self.mode.accepts_motion() || self.motion_paused {
            return false;
        }
        match feed.take_latest() {
            Some(sample) => self.handle_attitude(sample).is_some(),
            None => false,
        }
    }

    pub fn handle_drag(&mut self, delta: DragDelta) {
        if !self.mode.accepts_touch() {
            return;
        }
        let (x, y) = fusion::drag_radians(delta, self.view, self.settings.pan_speed, self.projection);
        match self.mode.touch_offset_mut() {
            // The next attitude sample picks these up.
            Some(offset) => offset.accumulate(x, y),
            None => {
                self.orientation = Orientation::new(fusion::compose_touch(self.orientation.quat(), x, y));
            }
        }
        self.report_movement();
    }

    pub fn handle_pinch(&mut self, pinch: PinchGesture) {
        if !self.mode.accepts_touch() {
            return;
        }
        match pinch.phase {
            GesturePhase::Began => self.pinch_start = Some(self.fov),
            GesturePhase::Changed => {
                let start = *self.pinch_start.get_or_insert(self.fov);
                self.fov = fusion::apply_pinch(self.fov, pinch.scale, start, self.settings.fov_bounds);
                self.report_movement();
            }
            GesturePhase::Ended | GesturePhase::Cancelled => self.pinch_start = None,
        }
    }

    pub fn handle_rotation(&mut self, rotation: RotationGesture) {
        if !self.mode.accepts_touch() || !self.projection.allows_roll() {
            return;
        }
        match rotation.phase {
            GesturePhase::Began => {
                // Pause before the first delta can be fought by the sensor.
                self.motion_paused = self.mode.accepts_motion();
                self.apply_roll(rotation.delta_radians);
            }
            phase => {
                self.apply_roll(rotation.delta_radians);
                if phase.is_finished() {
                    self.motion_paused = false;
                }
            }
        }
    }

    fn apply_roll(&mut self, delta: f64) {
        if delta != 0.0 {
            self.orientation = fusion::apply_roll(self.orientation, delta, self.projection);
        }
    }

    /// World angle (degrees) under the tap; observers are told as well.
    ///
    /// Taps count in every control method, Motion included.
    pub fn handle_tap(&mut self, tap: TapEvent) -> f64 {
        let angle = fusion::pixel_to_angle(
            tap.x,
            self.view.width,
            self.camera_angle().to_degrees(),
            self.horizontal_fov_degrees(),
        );
        log::debug!("tap at x={:.1} -> {angle:.2}°", tap.x);
        if let Some(observer) = self.observer.as_mut() {
            observer.tapped(angle);
        }
        angle
    }

    fn report_movement(&mut self) {
        self.publish(self.current_report(), true);
    }

    /// The compass sees every report. The host handler sees gated movement
    /// only, never resets or layout changes.
    fn publish(&mut self, report: MovementReport, call_handler: bool) {
        let admitted = if call_handler {
            self.gate.admit(report)
        } else {
            self.gate.force(report);
            false
        };
        if let Some(observer) = self.observer.as_mut() {
            observer.compass_updated(&report);
            if admitted {
                observer.orientation_changed(&report);
            }
        }
    }
}

//! Camera-orientation fusion for an embeddable panorama viewer.
//!
//! Device attitude and touch gestures are combined into one camera
//! orientation by [`OrientationFusionEngine`]. Attitude samples are
//! delivered from a background [`MotionFeed`]; everything else is driven by
//! the host's input events.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod events;
pub mod fov;
pub mod fusion;
pub mod motion;
pub mod orientation;
pub mod panorama;
pub mod report;

pub use config::ViewerConfig;
pub use control::{ControlMethod, InputMode, TouchOffset};
pub use engine::{FusionSettings, OrientationFusionEngine};
pub use error::{PanoramaError, Result};
pub use events::{
    AttitudeSample, DragDelta, GesturePhase, InputEvent, PanSpeed, PinchGesture, RotationGesture, TapEvent,
    ViewSize,
};
pub use fov::{FieldOfView, FovBounds};
pub use motion::{MotionFeed, MotionSource, ScriptedSource, SwayingSource};
pub use orientation::{Orientation, ScreenOrientation};
pub use panorama::ProjectionMode;
pub use report::{FusionObserver, MovementReport, ReportGate};

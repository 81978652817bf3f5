// input.rs — 把鼠标事件翻译成触摸手势（桌面上没有触摸屏）
//
// 左键拖动 = 平移, 左键轻点 = tap, 滚轮 = 捏合缩放, 右键拖动 = 旋转

use std::f64::consts::TAU;

use panorama_fusion::{DragDelta, GesturePhase, InputEvent, PinchGesture, RotationGesture, TapEvent};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Moving less than this between press and release counts as a tap.
const TAP_SLOP_PX: f64 = 4.0;
const PINCH_STEP: f64 = 1.1;

#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<PhysicalPosition<f64>>,
    left: Option<Press>,
    right_down: bool,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: PhysicalPosition<f64>,
    dragged: bool,
}

impl PointerTracker {
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let Some(cursor) = self.cursor else {
            return out;
        };

        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => {
                self.left = Some(Press { origin: cursor, dragged: false });
            }
            (MouseButton::Left, ElementState::Released) => {
                if let Some(press) = self.left.take() {
                    if !press.dragged {
                        out.push(InputEvent::Tap(TapEvent { x: cursor.x, y: cursor.y }));
                    }
                }
            }
            (MouseButton::Right, ElementState::Pressed) => {
                self.right_down = true;
                out.push(rotation(0.0, GesturePhase::Began));
            }
            (MouseButton::Right, ElementState::Released) => {
                if self.right_down {
                    self.right_down = false;
                    out.push(rotation(0.0, GesturePhase::Ended));
                }
            }
            _ => {}
        }
        out
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>, view_width: f64) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let last = self.cursor.replace(position);
        let Some(last) = last else {
            return out;
        };
        let dx = position.x - last.x;
        let dy = position.y - last.y;

        if let Some(press) = self.left.as_mut() {
            if !press.dragged {
                let moved = (position.x - press.origin.x).hypot(position.y - press.origin.y);
                press.dragged = moved >= TAP_SLOP_PX;
            }
            if press.dragged {
                out.push(InputEvent::Drag(DragDelta::new(dx, dy)));
            }
        }

        if self.right_down && view_width > 0.0 {
            out.push(rotation(dx / view_width * TAU, GesturePhase::Changed));
        }
        out
    }

    /// One complete pinch per wheel event.
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) -> Vec<InputEvent> {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => f64::from(y),
            MouseScrollDelta::PixelDelta(pos) => pos.y / 20.0,
        };
        if notches == 0.0 {
            return Vec::new();
        }
        let scale = PINCH_STEP.powf(notches);
        vec![
            pinch(1.0, GesturePhase::Began),
            pinch(scale, GesturePhase::Changed),
            pinch(scale, GesturePhase::Ended),
        ]
    }

    /// Window lost focus or the pointer left: finish whatever was active.
    pub fn cancel(&mut self) -> Vec<InputEvent> {
        self.left = None;
        if std::mem::take(&mut self.right_down) {
            vec![rotation(0.0, GesturePhase::Cancelled)]
        } else {
            Vec::new()
        }
    }
}

fn rotation(delta_radians: f64, phase: GesturePhase) -> InputEvent {
    InputEvent::Rotation(RotationGesture { delta_radians, phase })
}

fn pinch(scale: f64, phase: GesturePhase) -> InputEvent {
    InputEvent::Pinch(PinchGesture { scale, phase })
}

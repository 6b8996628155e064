use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller, DragMode};

/// Pixels of a touchpad scroll treated as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// Pointer motion gathered since the last frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Active drag and its cursor delta in physical pixels
    pub drag: Option<(DragMode, f32, f32)>,
    /// Wheel lines, positive away from the user
    pub scroll: f32,
}

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// Current mouse position (relative to window)
    mouse_position: Option<(f32, f32)>,
    /// Mouse movement delta since last reset
    mouse_delta: (f32, f32),
    scroll_lines: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            mouse_position: None,
            mouse_delta: (0.0, 0.0),
            scroll_lines: 0.0,
        }
    }

    /// Process a Winit WindowEvent and update internal state
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if let Some(button) = Self::keycode_to_button(keycode) {
                        self.set_state(button, event.state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = Self::mouse_button_to_button(*button) {
                    self.set_state(btn, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.scroll(*y),
                MouseScrollDelta::PixelDelta(pos) => self.scroll(pos.y as f32 / PIXELS_PER_LINE),
            },
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    fn set_state(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => self.press(button),
            ElementState::Released => self.release(button),
        }
    }

    pub fn press(&mut self, button: Button) {
        self.pressed_keys.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.pressed_keys.remove(&button);
    }

    /// Drops every held button, e.g. when the window loses focus mid-drag
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position {
            self.mouse_delta.0 += x - old_x;
            self.mouse_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    pub fn scroll(&mut self, lines: f32) {
        if lines.is_finite() {
            self.scroll_lines += lines;
        }
    }

    /// Returns the input gathered this frame and resets the deltas.
    /// Cursor motion without a held button is discarded.
    pub fn take_frame_input(&mut self) -> FrameInput {
        let (dx, dy) = self.mouse_delta;
        let input = FrameInput {
            drag: self
                .drag_mode()
                .filter(|_| dx != 0.0 || dy != 0.0)
                .map(|mode| (mode, dx, dy)),
            scroll: self.scroll_lines,
        };
        self.reset_deltas();
        input
    }

    /// Reset per-frame state (mouse delta and scroll)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_lines = 0.0;
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            _ => None,
        }
    }
}

impl Default for WinitController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit events need a DeviceId that cannot be built outside winit, so
    // these drive the same state changes through the public helpers.

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.mouse_position(), None);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_first_cursor_position_has_no_delta() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 100.0);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        controller.move_cursor(110.0, 95.0);
        controller.move_cursor(120.0, 90.0);
        assert_eq!(controller.mouse_delta(), (20.0, -10.0));
    }

    #[test]
    fn test_drag_reported_while_button_held() {
        let mut controller = WinitController::new();
        controller.move_cursor(0.0, 0.0);
        controller.press(Button::MouseLeft);
        controller.move_cursor(5.0, 3.0);

        let input = controller.take_frame_input();
        assert_eq!(input.drag, Some((DragMode::Orbit, 5.0, 3.0)));
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        assert_eq!(controller.take_frame_input().drag, None);
    }

    #[test]
    fn test_hover_motion_is_not_a_drag() {
        let mut controller = WinitController::new();
        controller.move_cursor(0.0, 0.0);
        controller.move_cursor(50.0, 0.0);
        assert_eq!(controller.take_frame_input(), FrameInput::default());
    }

    #[test]
    fn test_scroll_accumulates_until_taken() {
        let mut controller = WinitController::new();
        controller.scroll(1.0);
        controller.scroll(2.5);
        controller.scroll(f32::NAN);
        assert_eq!(controller.take_frame_input().scroll, 3.5);
        assert_eq!(controller.take_frame_input().scroll, 0.0);
    }

    #[test]
    fn test_release_all_ends_drag() {
        let mut controller = WinitController::new();
        controller.press(Button::MouseRight);
        controller.press(Button::Escape);
        assert!(controller.is_down(Button::MouseRight));

        controller.release_all();
        assert_eq!(controller.drag_mode(), None);
        assert!(!controller.is_down(Button::Escape));
    }
}

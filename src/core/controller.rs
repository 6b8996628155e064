/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseRight,
    Shift,
    Escape,
}

/// What a pointer drag does to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Orbit,
    Pan,
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Left drag orbits, right or shift+left drag pans
    fn drag_mode(&self) -> Option<DragMode> {
        if self.is_down(Button::MouseRight)
            || (self.is_down(Button::MouseLeft) && self.is_down(Button::Shift))
        {
            Some(DragMode::Pan)
        } else if self.is_down(Button::MouseLeft) {
            Some(DragMode::Orbit)
        } else {
            None
        }
    }
}

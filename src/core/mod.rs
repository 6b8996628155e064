pub mod controller;
pub mod input_adapter;

pub use controller::{Button, Controller, DragMode};
pub use input_adapter::{FrameInput, WinitController};

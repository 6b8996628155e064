use std::fmt;

use glam::Vec3;

use crate::camera::OrbitCamera;

/// Camera position formatted for display, two decimals per axis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayedCameraPosition {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl DisplayedCameraPosition {
    pub fn from_vec(position: Vec3) -> Self {
        Self {
            x: format!("{:.2}", position.x),
            y: format!("{:.2}", position.y),
            z: format!("{:.2}", position.z),
        }
    }
}

impl fmt::Display for DisplayedCameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {}  Y: {}  Z: {}", self.x, self.y, self.z)
    }
}

/// Snapshots the camera once per frame. Only formats when the position
/// actually changed.
#[derive(Debug, Default)]
pub struct CameraReporter {
    last: Option<Vec3>,
    displayed: DisplayedCameraPosition,
}

impl CameraReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, camera: &OrbitCamera) -> &DisplayedCameraPosition {
        let position = camera.position();
        if self.last != Some(position) {
            self.last = Some(position);
            self.displayed = DisplayedCameraPosition::from_vec(position);
        }
        &self.displayed
    }

    pub fn displayed(&self) -> &DisplayedCameraPosition {
        &self.displayed
    }
}

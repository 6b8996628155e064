use glam::{Mat4, Vec3};

use crate::config::{CameraConfig, ControlsConfig};

/// Keeps the orbit away from the poles so look-at stays well defined
const MAX_POLAR_OFFSET: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera that always looks at `target` and orbits around it
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig, controls: &ControlsConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            min_distance: controls.min_distance,
            max_distance: controls.max_distance,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Unit vector from the camera towards its target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Moves along the current view axis; orientation is unchanged
    pub fn set_distance(&mut self, distance: f32) {
        let back = -self.forward();
        self.position = self.target + back * distance;
    }

    /// Rotates the camera around its target.
    /// Positive `yaw` swings the camera to the left, positive `pitch` raises it.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) - yaw;
        let elevation = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch)
            .clamp(-MAX_POLAR_OFFSET, MAX_POLAR_OFFSET);

        let horizontal = radius * elevation.cos();
        self.position = self.target
            + Vec3::new(
                horizontal * azimuth.sin(),
                radius * elevation.sin(),
                horizontal * azimuth.cos(),
            );
    }

    /// Translates camera and target together in the view plane.
    /// Offsets are in fractions of the viewport height.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = self.right();
        let up = right.cross(forward);

        // Height of the view frustum at the target plane
        let visible_height = 2.0 * self.distance() * (self.fov_radians() * 0.5).tan();
        let delta = (-right * dx + up * dy) * visible_height;

        self.position += delta;
        self.target += delta;
    }

    /// Scales the distance to the target by `factor`, within the configured limits
    pub fn zoom(&mut self, factor: f32) {
        let distance = (self.distance() * factor).clamp(self.min_distance, self.max_distance);
        self.set_distance(distance);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), aspect.max(1e-4), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

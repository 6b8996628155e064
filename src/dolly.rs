use glam::Vec3;

use crate::camera::OrbitCamera;
use crate::loader::LoadToken;

/// Camera fly-in owned by the load that started it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Dolly {
    #[default]
    Idle,
    Animating {
        token: LoadToken,
        start: f32,
        target: f32,
        progress: f32,
        step: f32,
    },
    Done {
        token: LoadToken,
    },
}

impl Dolly {
    /// Begins at `start` distance; `step` is the fraction of the way covered per frame
    pub fn start(token: LoadToken, start: f32, target: f32, step: f32) -> Self {
        Dolly::Animating {
            token,
            start,
            target,
            progress: 0.0,
            step: step.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, Dolly::Animating { .. })
    }

    pub fn progress(&self) -> Option<f32> {
        match self {
            Dolly::Animating { progress, .. } => Some(*progress),
            Dolly::Done { .. } => Some(1.0),
            Dolly::Idle => None,
        }
    }

    /// Frames needed to finish from zero progress
    pub fn steps_to_finish(step: f32) -> u32 {
        (1.0 / step.clamp(f32::EPSILON, 1.0)).ceil() as u32
    }

    /// Advances one frame, moving the camera along its view axis and
    /// re-aiming it at the origin. Returns true while still animating.
    pub fn step(&mut self, camera: &mut OrbitCamera, latest: Option<LoadToken>) -> bool {
        let Dolly::Animating {
            token,
            start,
            target,
            progress,
            step,
        } = *self
        else {
            return false;
        };

        if latest != Some(token) {
            log::debug!("Dolly for load {} cancelled by a newer load", token);
            *self = Dolly::Idle;
            return false;
        }

        // Snap the last step so float drift cannot add an extra frame
        let progress = progress + step;
        let progress = if 1.0 - progress <= step * 1e-3 {
            1.0
        } else {
            progress
        };
        camera.look_at(Vec3::ZERO);
        camera.set_distance(start + (target - start) * progress);

        if progress >= 1.0 {
            *self = Dolly::Done { token };
            false
        } else {
            *self = Dolly::Animating {
                token,
                start,
                target,
                progress,
                step,
            };
            true
        }
    }
}

use glam::{Mat4, Vec3};

use crate::math::AABB;

/// Bounding boxes whose longest side is at most this are rejected
pub const MIN_DIMENSION: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("model has no geometry")]
    Empty,
    #[error("model bounds are degenerate (size {size:?})")]
    Degenerate { size: Vec3 },
}

/// Transform that moves a model's bounding-box center to the origin and
/// scales its longest side to the target size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Vec3,
    pub size: Vec3,
    pub scale: f32,
}

impl Normalization {
    pub fn from_bounds(bounds: Option<&AABB>, target_size: f32) -> Result<Self, NormalizeError> {
        let bounds = bounds.filter(|b| !b.is_empty()).ok_or(NormalizeError::Empty)?;
        let size = bounds.size();
        let max_dimension = size.max_element();

        if !size.is_finite() || !bounds.center().is_finite() || max_dimension <= MIN_DIMENSION {
            return Err(NormalizeError::Degenerate { size });
        }

        Ok(Self {
            center: bounds.center(),
            size,
            scale: target_size / max_dimension,
        })
    }

    /// Model matrix: translate by -center, then scale uniformly about the origin
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale)) * Mat4::from_translation(-self.center)
    }

    /// Bounds of the model after the transform is applied
    pub fn normalized_bounds(&self) -> AABB {
        let half = self.size * self.scale * 0.5;
        AABB::new(-half, half)
    }
}

/// Distance at which a sphere-ish object `target_size` across fills the
/// vertical field of view, widened by `slack`
pub fn fit_distance(target_size: f32, fov_radians: f32, slack: f32) -> f32 {
    (target_size * 0.5) / (fov_radians * 0.5).tan() * slack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube_keeps_scale_one() {
        let bounds = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let n = Normalization::from_bounds(Some(&bounds), 2.0).unwrap();
        assert_eq!(n.scale, 1.0);
        assert_eq!(n.center, Vec3::ZERO);
        assert_eq!(n.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_long_box_scales_uniformly() {
        let bounds = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 2.0, 2.0));
        let n = Normalization::from_bounds(Some(&bounds), 2.0).unwrap();
        assert!((n.scale - 0.2).abs() < 1e-6);

        let (scale, _, _) = n.matrix().to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(0.2), 1e-6));
    }

    #[test]
    fn test_transformed_bounds_are_centered_and_sized() {
        let bounds = AABB::new(Vec3::new(3.0, -7.0, 100.0), Vec3::new(4.5, -2.0, 101.0));
        let n = Normalization::from_bounds(Some(&bounds), 2.0).unwrap();
        let moved = bounds.transformed(&n.matrix());

        assert!(moved.center().abs_diff_eq(Vec3::ZERO, 1e-4));
        assert!((moved.max_dimension() - 2.0).abs() < 1e-4);
        assert!(moved.min.abs_diff_eq(n.normalized_bounds().min, 1e-4));
    }

    #[test]
    fn test_empty_bounds_rejected() {
        assert_eq!(Normalization::from_bounds(None, 2.0), Err(NormalizeError::Empty));
        assert_eq!(
            Normalization::from_bounds(Some(&AABB::empty()), 2.0),
            Err(NormalizeError::Empty)
        );
    }

    #[test]
    fn test_point_bounds_rejected() {
        let bounds = AABB::new(Vec3::ONE, Vec3::ONE);
        assert!(matches!(
            Normalization::from_bounds(Some(&bounds), 2.0),
            Err(NormalizeError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_flat_model_is_fine() {
        // A plane has one zero extent but a usable longest side
        let bounds = AABB::new(Vec3::new(-4.0, 0.0, -1.0), Vec3::new(4.0, 0.0, 1.0));
        let n = Normalization::from_bounds(Some(&bounds), 2.0).unwrap();
        assert_eq!(n.scale, 0.25);
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let bounds = AABB::new(Vec3::ZERO, Vec3::new(f32::INFINITY, 1.0, 1.0));
        assert!(matches!(
            Normalization::from_bounds(Some(&bounds), 2.0),
            Err(NormalizeError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_fit_distance() {
        let fov = 40f32.to_radians();
        let d = fit_distance(2.0, fov, 1.4);
        let expected = 1.0 / (20f32.to_radians()).tan() * 1.4;
        assert!((d - expected).abs() < 1e-5);
        assert!(d.is_finite() && d > 0.0);
    }

    #[test]
    fn test_fit_distance_positive_for_any_fov() {
        for degrees in [1.0f32, 10.0, 45.0, 90.0, 179.0] {
            let d = fit_distance(2.0, degrees.to_radians(), 1.4);
            assert!(d.is_finite() && d > 0.0, "fov {} gave {}", degrees, d);
        }
    }
}

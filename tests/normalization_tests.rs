mod common;

use glam::Vec3;
use glb_viewer::loaders::decode_gltf;
use glb_viewer::normalize::{fit_distance, Normalization, NormalizeError};

use common::{box_glb, empty_glb, scene_glb, NodeSpec};

fn normalize(bytes: &[u8]) -> Result<Normalization, NormalizeError> {
    let model = decode_gltf("fixture.glb", bytes, None).unwrap();
    Normalization::from_bounds(model.bounds.as_ref(), 2.0)
}

#[cfg(test)]
mod normalization_tests {
    use super::*;

    #[test]
    fn test_cube_decodes_with_expected_geometry() {
        let model = decode_gltf("cube.glb", &box_glb([-1.0; 3], [1.0; 3]), None).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.triangle_count(), 12);

        let bounds = model.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::splat(-1.0));
        assert_eq!(bounds.max, Vec3::splat(1.0));
        // Normals were computed since the fixture has none
        assert!(model.meshes[0].normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_unit_cube_is_left_as_is() {
        let n = normalize(&box_glb([-1.0; 3], [1.0; 3])).unwrap();
        assert_eq!(n.scale, 1.0);
        assert_eq!(n.center, Vec3::ZERO);
    }

    #[test]
    fn test_long_box_scales_to_target_on_all_axes() {
        let n = normalize(&box_glb([0.0, 0.0, 0.0], [10.0, 2.0, 2.0])).unwrap();
        assert!((n.scale - 0.2).abs() < 1e-6);
        assert_eq!(n.center, Vec3::new(5.0, 1.0, 1.0));

        let bounds = n.normalized_bounds();
        assert!(bounds.size().abs_diff_eq(Vec3::new(2.0, 0.4, 0.4), 1e-5));
    }

    #[test]
    fn test_offset_model_ends_up_centered() {
        let bytes = box_glb([100.0, -50.0, 7.0], [103.0, -49.0, 8.0]);
        let model = decode_gltf("offset.glb", &bytes, None).unwrap();
        let n = Normalization::from_bounds(model.bounds.as_ref(), 2.0).unwrap();

        let placed = model.bounds.unwrap().transformed(&n.matrix());
        assert!(placed.center().abs_diff_eq(Vec3::ZERO, 1e-4));
        assert!((placed.max_dimension() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_node_transforms_are_baked() {
        let root = NodeSpec::default()
            .translated([10.0, 0.0, 0.0])
            .with_child(NodeSpec::mesh().scaled([2.0, 2.0, 2.0]));
        let bytes = scene_glb([-1.0; 3], [1.0; 3], &[root], true);

        let model = decode_gltf("nested.glb", &bytes, None).unwrap();
        let bounds = model.bounds.unwrap();
        assert!(bounds.min.abs_diff_eq(Vec3::new(8.0, -2.0, -2.0), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(12.0, 2.0, 2.0), 1e-5));
    }

    #[test]
    fn test_instanced_mesh_contributes_every_instance() {
        let left = NodeSpec::mesh().translated([-5.0, 0.0, 0.0]);
        let right = NodeSpec::mesh().translated([5.0, 0.0, 0.0]);
        let bytes = scene_glb([-1.0; 3], [1.0; 3], &[left, right], true);

        let model = decode_gltf("pair.glb", &bytes, None).unwrap();
        assert_eq!(model.meshes.len(), 2);

        let n = Normalization::from_bounds(model.bounds.as_ref(), 2.0).unwrap();
        assert!((n.scale - 2.0 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_indices_generate_a_triangle_list() {
        let bytes = scene_glb([-1.0; 3], [1.0; 3], &[NodeSpec::mesh()], false);
        let model = decode_gltf("soup.glb", &bytes, None).unwrap();
        assert_eq!(model.vertex_count(), 36);
        assert_eq!(model.triangle_count(), 12);
    }

    #[test]
    fn test_flat_point_model_is_degenerate() {
        let err = normalize(&box_glb([3.0; 3], [3.0; 3])).unwrap_err();
        assert!(matches!(err, NormalizeError::Degenerate { .. }));
    }

    #[test]
    fn test_model_without_geometry_is_empty() {
        assert_eq!(normalize(&empty_glb()).unwrap_err(), NormalizeError::Empty);
    }

    #[test]
    fn test_truncated_file_fails_to_decode() {
        let bytes = box_glb([-1.0; 3], [1.0; 3]);
        assert!(decode_gltf("cut.glb", &bytes[..bytes.len() / 2], None).is_err());
    }

    #[test]
    fn test_fit_distance_is_finite_and_positive() {
        for fov in [10.0f32, 40.0, 75.0, 120.0] {
            let d = fit_distance(2.0, fov.to_radians(), 1.4);
            assert!(d.is_finite() && d > 0.0);
        }
    }
}

use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use crate::math::AABB;

/// Base color used when a primitive has no material
const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// One triangle-list primitive with node transforms already applied
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Linear RGBA base color factor
    pub color: [f32; 4],
}

impl MeshData {
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.positions.iter().copied())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Every drawable primitive of a glTF asset, in model space
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub bounds: Option<AABB>,
}

impl DecodedModel {
    pub fn new(name: impl Into<String>, meshes: Vec<MeshData>) -> Self {
        let bounds = meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|a, b| a.union(&b));

        Self {
            name: name.into(),
            meshes,
            bounds,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

/// Decodes a .glb or .gltf held in memory.
///
/// `base_dir` resolves external buffer URIs of a .gltf; embedded and
/// data-URI buffers need none.
pub fn decode_gltf(name: &str, bytes: &[u8], base_dir: Option<&Path>) -> Result<DecodedModel> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).with_context(|| format!("Failed to parse glTF: {}", name))?;
    let buffers = gltf::import_buffers(&document, base_dir, blob)
        .with_context(|| format!("Failed to load glTF buffers: {}", name))?;

    log::debug!(
        "glTF {}: {} scenes, {} nodes, {} meshes",
        name,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                process_node(&node, &buffers, &Mat4::IDENTITY, &mut meshes)?;
            }
        }
        None => log::warn!("glTF {} has no scenes", name),
    }

    let model = DecodedModel::new(name, meshes);
    log::info!(
        "Decoded {}: {} primitives, {} vertices, {} triangles",
        name,
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let mesh_name = mesh
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("mesh {}", mesh.index()));
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive {} of {}",
                primitive.mode(),
                primitive.index(),
                mesh_name
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .with_context(|| format!("Primitive of {} has no positions", mesh_name))?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let indices = valid_triangles(indices, positions.len(), &mesh_name);

        let normals = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => compute_normals(&positions, &indices),
        };

        let color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        meshes.push(MeshData {
            name: format!("{} #{}", mesh_name, primitive.index()),
            positions,
            normals,
            indices,
            color: if primitive.material().index().is_some() {
                color
            } else {
                DEFAULT_COLOR
            },
        });
    }

    Ok(())
}

/// Drops a trailing partial triangle and any triangle with out-of-range indices
fn valid_triangles(indices: Vec<u32>, vertex_count: usize, mesh_name: &str) -> Vec<u32> {
    let total = indices.len() / 3;
    let kept: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
        .flatten()
        .copied()
        .collect();

    if kept.len() / 3 != total {
        log::warn!(
            "{}: dropped {} triangles with invalid indices",
            mesh_name,
            total - kept.len() / 3
        );
    }
    kept
}

/// Area-weighted smooth normals for meshes that ship without them
pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(positions: Vec<Vec3>) -> MeshData {
        let indices = (0..positions.len() as u32).collect::<Vec<_>>();
        MeshData {
            name: "test".into(),
            normals: compute_normals(&positions, &indices),
            positions,
            indices,
            color: DEFAULT_COLOR,
        }
    }

    #[test]
    fn test_model_bounds_cover_all_meshes() {
        let a = mesh(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        let b = mesh(vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::Z * 3.0, Vec3::Y]);
        let model = DecodedModel::new("pair", vec![a, b]);

        let bounds = model.bounds.unwrap();
        assert_eq!(bounds.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        let model = DecodedModel::new("empty", Vec::new());
        assert!(model.bounds.is_none());
    }

    #[test]
    fn test_compute_normals_of_ccw_triangle() {
        let normals = compute_normals(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
        for n in normals {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_compute_normals_unused_vertex_defaults_up() {
        let normals = compute_normals(&[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE], &[0, 1, 2]);
        assert_eq!(normals[3], Vec3::Y);
    }

    #[test]
    fn test_valid_triangles_drops_bad_indices() {
        let kept = valid_triangles(vec![0, 1, 2, 0, 1, 9, 2, 1], 3, "test");
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_gltf("junk.glb", b"definitely not gltf", None).is_err());
    }
}

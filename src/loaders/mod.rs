pub mod gltf;

pub use gltf::{compute_normals, decode_gltf, DecodedModel, MeshData};

// Shared helpers for integration tests: in-memory GLB fixtures
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use anyhow::Result;
use glb_viewer::intake::ResourceHandle;
use glb_viewer::loader::ModelDecoder;
use glb_viewer::loaders::{decode_gltf, DecodedModel};
use serde_json::{json, Value};

const GLB_MAGIC: &[u8; 4] = b"glTF";
const CHUNK_JSON: &[u8; 4] = b"JSON";
const CHUNK_BIN: &[u8; 4] = b"BIN\0";

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Packs a glTF JSON document and its binary buffer into a .glb container
pub fn glb(document: &Value, bin: &[u8]) -> Vec<u8> {
    let mut json = serde_json::to_vec(document).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let has_bin = !bin.is_empty();
    let total = 12 + 8 + json.len() + if has_bin { 8 + bin.len() } else { 0 };

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(GLB_MAGIC);
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(CHUNK_JSON);
    out.extend_from_slice(&json);

    if has_bin {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(CHUNK_BIN);
        out.extend_from_slice(&bin);
    }
    out
}

/// The eight corners of an axis-aligned box and its twelve triangles
pub fn box_geometry(min: [f32; 3], max: [f32; 3]) -> (Vec<[f32; 3]>, Vec<u32>) {
    let corners = (0..8)
        .map(|i| {
            [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ]
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    (corners, indices)
}

/// Node placed in the fixture scene: optional transform, optional mesh, children
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub translation: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
    pub mesh: bool,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn mesh() -> Self {
        Self {
            mesh: true,
            ..Self::default()
        }
    }

    pub fn translated(mut self, t: [f32; 3]) -> Self {
        self.translation = Some(t);
        self
    }

    pub fn scaled(mut self, s: [f32; 3]) -> Self {
        self.scale = Some(s);
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// One mesh made of a single box primitive, instanced by every node that has `mesh: true`
pub fn scene_glb(min: [f32; 3], max: [f32; 3], roots: &[NodeSpec], with_indices: bool) -> Vec<u8> {
    let (positions, indices) = box_geometry(min, max);
    let (positions, indices): (Vec<[f32; 3]>, Vec<u32>) = if with_indices {
        (positions, indices)
    } else {
        (indices.iter().map(|&i| positions[i as usize]).collect(), Vec::new())
    };

    let mut bin = Vec::new();
    for p in &positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len();
    for i in &indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let mut nodes = Vec::new();
    let root_ids: Vec<usize> = roots.iter().map(|n| push_node(n, &mut nodes)).collect();

    let mut buffer_views = vec![json!({
        "buffer": 0, "byteOffset": 0, "byteLength": positions_len, "target": ARRAY_BUFFER
    })];
    let mut accessors = vec![json!({
        "bufferView": 0, "componentType": FLOAT, "count": positions.len(), "type": "VEC3",
        "min": min, "max": max
    })];
    let mut primitive = json!({ "attributes": { "POSITION": 0 } });

    if with_indices {
        buffer_views.push(json!({
            "buffer": 0, "byteOffset": positions_len,
            "byteLength": indices.len() * 4, "target": ELEMENT_ARRAY_BUFFER
        }));
        accessors.push(json!({
            "bufferView": 1, "componentType": UNSIGNED_INT, "count": indices.len(), "type": "SCALAR"
        }));
        primitive["indices"] = json!(1);
    }

    let document = json!({
        "asset": { "version": "2.0", "generator": "fixture" },
        "scene": 0,
        "scenes": [{ "nodes": root_ids }],
        "nodes": nodes,
        "meshes": [{ "name": "box", "primitives": [primitive] }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": buffer_views,
        "accessors": accessors,
    });

    glb(&document, &bin)
}

fn push_node(spec: &NodeSpec, nodes: &mut Vec<Value>) -> usize {
    let index = nodes.len();
    nodes.push(json!({}));

    let children: Vec<usize> = spec.children.iter().map(|c| push_node(c, nodes)).collect();

    let mut node = json!({});
    if spec.mesh {
        node["mesh"] = json!(0);
    }
    if let Some(t) = spec.translation {
        node["translation"] = json!(t);
    }
    if let Some(s) = spec.scale {
        node["scale"] = json!(s);
    }
    if !children.is_empty() {
        node["children"] = json!(children);
    }
    nodes[index] = node;
    index
}

/// A single indexed box at the scene root
pub fn box_glb(min: [f32; 3], max: [f32; 3]) -> Vec<u8> {
    scene_glb(min, max, &[NodeSpec::mesh()], true)
}

/// A valid document with a scene but no geometry
pub fn empty_glb() -> Vec<u8> {
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "empty" }],
    });
    glb(&document, &[])
}

/// Decoder that blocks each file until the test releases it
#[derive(Default)]
pub struct GatedDecoder {
    gates: Mutex<HashMap<String, Receiver<()>>>,
}

impl GatedDecoder {
    pub fn gate(&self, name: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(name.to_string(), rx);
        tx
    }
}

impl ModelDecoder for GatedDecoder {
    fn decode(&self, handle: ResourceHandle) -> Result<DecodedModel> {
        let gate = self.gates.lock().unwrap().remove(handle.name());
        if let Some(gate) = gate {
            gate.recv().ok();
        }
        decode_gltf(handle.name(), handle.bytes(), None)
    }
}

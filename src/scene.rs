use std::sync::Arc;

use glam::Mat4;

use crate::loader::LoadToken;
use crate::loaders::DecodedModel;
use crate::math::AABB;
use crate::normalize::Normalization;

/// A decoded model placed in the scene with its normalizing transform
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub token: LoadToken,
    pub model: Arc<DecodedModel>,
    pub normalization: Normalization,
}

impl ModelNode {
    pub fn transform(&self) -> Mat4 {
        self.normalization.matrix()
    }

    /// Bounds after normalization, centered on the origin
    pub fn world_bounds(&self) -> Option<AABB> {
        self.model
            .bounds
            .map(|bounds| bounds.transformed(&self.transform()))
    }
}

/// Group node holding the model currently on screen.
///
/// Inserting always replaces whatever was there, so the group never holds
/// more than one model.
#[derive(Debug, Default)]
pub struct SceneGraph {
    model: Option<ModelNode>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every child; returns the node that was dropped, if any
    pub fn clear(&mut self) -> Option<ModelNode> {
        let removed = self.model.take();
        if let Some(node) = &removed {
            log::debug!("Removed {} (load {}) from scene", node.model.name, node.token);
            self.revision += 1;
        }
        removed
    }

    pub fn insert(&mut self, node: ModelNode) {
        if let Some(old) = self.clear() {
            log::warn!("Replacing {} that was still in the scene", old.model.name);
        }
        log::debug!("Inserted {} (load {}) into scene", node.model.name, node.token);
        self.model = Some(node);
        self.revision += 1;
    }

    pub fn model(&self) -> Option<&ModelNode> {
        self.model.as_ref()
    }

    pub fn len(&self) -> usize {
        usize::from(self.model.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none()
    }

    /// Bumped on every change; lets the renderer know when to re-upload
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

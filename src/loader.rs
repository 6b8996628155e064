use std::fmt;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use glam::Vec3;

use crate::camera::OrbitCamera;
use crate::config::NormalizeConfig;
use crate::dolly::Dolly;
use crate::intake::ResourceHandle;
use crate::loaders::{decode_gltf, DecodedModel};
use crate::normalize::{fit_distance, Normalization};
use crate::scene::{ModelNode, SceneGraph};

/// Identifies one load request; later requests carry larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Turns the bytes of a resource handle into geometry.
/// Runs on a worker thread.
pub trait ModelDecoder: Send + Sync + 'static {
    fn decode(&self, handle: ResourceHandle) -> Result<DecodedModel>;
}

/// Decodes .glb and .gltf files with the `gltf` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfDecoder;

impl ModelDecoder for GltfDecoder {
    fn decode(&self, handle: ResourceHandle) -> Result<DecodedModel> {
        decode_gltf(handle.name(), handle.bytes(), handle.base_dir())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading {
        token: LoadToken,
        name: String,
    },
    Loaded {
        token: LoadToken,
        name: String,
        vertices: usize,
        triangles: usize,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => write!(f, "No model loaded"),
            LoadState::Loading { name, .. } => write!(f, "Loading {}…", name),
            LoadState::Loaded {
                name,
                vertices,
                triangles,
                ..
            } => write!(f, "{}: {} vertices, {} triangles", name, vertices, triangles),
            LoadState::Failed { name, error } => write!(f, "Failed to load {}: {}", name, error),
        }
    }
}

struct LoadResult {
    token: LoadToken,
    name: String,
    model: Result<DecodedModel>,
}

/// Decodes models on worker threads. Every request gets a new token and
/// only the result carrying the latest one is placed in the scene.
pub struct ModelLoader {
    decoder: Arc<dyn ModelDecoder>,
    settings: NormalizeConfig,
    next_token: u64,
    latest: Option<LoadToken>,
    in_flight: usize,
    state: LoadState,
    sender: UnboundedSender<LoadResult>,
    receiver: UnboundedReceiver<LoadResult>,
}

impl ModelLoader {
    pub fn new(settings: &NormalizeConfig) -> Self {
        Self::with_decoder(settings, Arc::new(GltfDecoder))
    }

    pub fn with_decoder(settings: &NormalizeConfig, decoder: Arc<dyn ModelDecoder>) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            decoder,
            settings: settings.clone(),
            next_token: 1,
            latest: None,
            in_flight: 0,
            state: LoadState::Idle,
            sender,
            receiver,
        }
    }

    /// Token of the most recent request, if any
    pub fn latest(&self) -> Option<LoadToken> {
        self.latest
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Decodes still running, including ones whose result will be discarded
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn target_size(&self) -> f32 {
        self.settings.target_size
    }

    /// Starts loading `handle`. The scene is emptied right away so the old
    /// model is gone before the new one can appear.
    pub fn request(&mut self, handle: ResourceHandle, scene: &mut SceneGraph) -> LoadToken {
        scene.clear();

        let token = LoadToken(self.next_token);
        self.next_token += 1;
        self.latest = Some(token);
        self.in_flight += 1;

        let name = handle.name().to_string();
        log::info!("Load {} requested for {}", token, name);
        self.state = LoadState::Loading {
            token,
            name: name.clone(),
        };

        let decoder = Arc::clone(&self.decoder);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("decode-{}", token.0))
            .spawn(move || {
                let model = decoder.decode(handle);
                if sender
                    .unbounded_send(LoadResult { token, name, model })
                    .is_err()
                {
                    log::debug!("Loader dropped before load {} finished", token);
                }
            })
            .context("Failed to spawn decode thread");

        if let Err(e) = spawned {
            log::error!("{:#}", e);
            self.in_flight -= 1;
            self.state = LoadState::Failed {
                name: self.state_name(),
                error: format!("{:#}", e),
            };
        }

        token
    }

    /// Forgets the current load and empties the scene. Decodes still running
    /// finish on their own and are discarded when polled.
    pub fn cancel(&mut self, scene: &mut SceneGraph) {
        if let Some(node) = scene.clear() {
            log::info!("Unloaded {} (load {})", node.model.name, node.token);
        }
        if let Some(token) = self.latest.take() {
            log::debug!("Load {} cancelled", token);
        }
        self.state = LoadState::Idle;
    }

    /// Like [`request`](Self::request), but does nothing without a handle
    pub fn submit(
        &mut self,
        handle: Option<ResourceHandle>,
        scene: &mut SceneGraph,
    ) -> Option<LoadToken> {
        handle.map(|handle| self.request(handle, scene))
    }

    /// Applies finished decodes. Stale results are dropped; the latest one is
    /// normalized, inserted into the scene and framed by the camera.
    /// Returns the token of the model placed this frame.
    pub fn poll(
        &mut self,
        scene: &mut SceneGraph,
        camera: &mut OrbitCamera,
        dolly: &mut Dolly,
    ) -> Option<LoadToken> {
        let mut placed = None;

        while let Ok(Some(result)) = self.receiver.try_next() {
            self.in_flight = self.in_flight.saturating_sub(1);

            if self.latest != Some(result.token) {
                log::debug!(
                    "Discarding stale load {} of {} (latest is {:?})",
                    result.token,
                    result.name,
                    self.latest.map(|t| t.0)
                );
                continue;
            }

            match self.place(result, scene, camera, dolly) {
                Ok(token) => placed = Some(token),
                Err(state) => self.state = state,
            }
        }

        placed
    }

    fn place(
        &mut self,
        result: LoadResult,
        scene: &mut SceneGraph,
        camera: &mut OrbitCamera,
        dolly: &mut Dolly,
    ) -> Result<LoadToken, LoadState> {
        let LoadResult { token, name, model } = result;

        let model = model.map_err(|e| {
            log::warn!("Failed to decode {}: {:#}", name, e);
            LoadState::Failed {
                name: name.clone(),
                error: format!("{:#}", e),
            }
        })?;

        let target_size = self.settings.target_size;
        let normalization =
            Normalization::from_bounds(model.bounds.as_ref(), target_size).map_err(|e| {
                log::warn!("Cannot place {}: {}", name, e);
                LoadState::Failed {
                    name: name.clone(),
                    error: e.to_string(),
                }
            })?;

        log::info!(
            "Placing {} (load {}): center {:?}, size {:?}, scale {:.4}",
            name,
            token,
            normalization.center,
            normalization.size,
            normalization.scale
        );

        self.state = LoadState::Loaded {
            token,
            name,
            vertices: model.vertex_count(),
            triangles: model.triangle_count(),
        };
        scene.insert(ModelNode {
            token,
            model: Arc::new(model),
            normalization,
        });

        let distance = fit_distance(target_size, camera.fov_radians(), self.settings.fit_slack);
        let start = distance * 2.0;
        camera.set_position(Vec3::new(0.0, 0.0, start));
        camera.look_at(Vec3::ZERO);
        *dolly = Dolly::start(token, start, distance, self.settings.dolly_step);

        Ok(token)
    }

    fn state_name(&self) -> String {
        match &self.state {
            LoadState::Loading { name, .. }
            | LoadState::Loaded { name, .. }
            | LoadState::Failed { name, .. } => name.clone(),
            LoadState::Idle => String::new(),
        }
    }
}

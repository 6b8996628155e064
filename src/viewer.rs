use std::path::{Path, PathBuf};

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::camera::OrbitCamera;
use crate::config::{ControlsConfig, ViewerConfig};
use crate::core::controller::DragMode;
use crate::core::input_adapter::{FrameInput, WinitController};
use crate::dolly::Dolly;
use crate::intake::{self, FileIntake, IntakeError, ResourceHandle};
use crate::lights::LightConfig;
use crate::loader::{LoadState, LoadToken, ModelLoader};
use crate::reporter::{CameraReporter, DisplayedCameraPosition};
use crate::scene::SceneGraph;

/// Path chosen in a file dialog, or None if it was dismissed
pub type PickedFile = LocalBoxFuture<'static, Option<PathBuf>>;

/// Ties the viewer state together and advances it one frame at a time.
/// Nothing here touches the GPU; the renderer reads the scene, camera and
/// lights after [`Viewer::frame`] has run.
pub struct Viewer {
    config: ViewerConfig,
    lights: LightConfig,
    intake: FileIntake,
    loader: ModelLoader,
    scene: SceneGraph,
    camera: OrbitCamera,
    dolly: Dolly,
    reporter: CameraReporter,
    input: WinitController,
    picking: Option<PickedFile>,
    notice: Option<String>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let loader = ModelLoader::new(&config.normalize);
        Self::with_loader(config, loader)
    }

    /// Builds a viewer around a custom loader, e.g. one with a different decoder
    pub fn with_loader(config: ViewerConfig, loader: ModelLoader) -> Self {
        let camera = OrbitCamera::new(&config.camera, &config.controls);
        Self {
            lights: config.lights,
            intake: FileIntake::new(),
            loader,
            scene: SceneGraph::new(),
            camera,
            dolly: Dolly::Idle,
            reporter: CameraReporter::new(),
            input: WinitController::new(),
            picking: None,
            notice: None,
            config,
        }
    }

    /// Reads a file and queues it for loading on the next frame
    pub fn open_path(&mut self, path: impl AsRef<Path>) -> Result<(), IntakeError> {
        match intake::open_path(path) {
            Ok(handle) => {
                self.select(handle);
                Ok(())
            }
            Err(e) => {
                log::warn!("{}", e);
                self.notice = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replaces the current model. The old one leaves the scene right away,
    /// even if the new file turns out to be empty; the new one is requested
    /// on the next frame.
    pub fn select(&mut self, handle: ResourceHandle) {
        self.notice = None;
        self.intake.select(handle);
        self.loader.cancel(&mut self.scene);
        self.dolly = Dolly::Idle;
    }

    /// Waits on a file dialog without blocking the frame loop. A dialog
    /// still open is kept and the new one dropped.
    pub fn pick_with(&mut self, picked: PickedFile) {
        if self.picking.is_none() {
            self.picking = Some(picked);
        }
    }

    pub fn is_picking(&self) -> bool {
        self.picking.is_some()
    }

    fn poll_picker(&mut self) {
        let Some(picking) = self.picking.as_mut() else {
            return;
        };
        let Some(picked) = picking.as_mut().now_or_never() else {
            return;
        };
        self.picking = None;
        match picked {
            Some(path) => {
                // Errors end up in the notice line
                let _ = self.open_path(path);
            }
            None => log::debug!("File dialog dismissed"),
        }
    }

    /// Advances one frame: takes a file picked in a dialog, hands a staged
    /// file to the loader, places a finished model, applies pointer input,
    /// steps the dolly and refreshes the camera readout. Returns true while
    /// anything is still in motion or pending.
    pub fn frame(&mut self, viewport_height: f32) -> bool {
        self.poll_picker();

        let handle = self.intake.tick();
        self.loader.submit(handle, &mut self.scene);
        self.loader
            .poll(&mut self.scene, &mut self.camera, &mut self.dolly);

        let input = self.input.take_frame_input();
        apply_input(&mut self.camera, &self.config.controls, input, viewport_height);

        let animating = self.dolly.step(&mut self.camera, self.loader.latest());
        self.reporter.observe(&self.camera);

        animating
            || self.loader.in_flight() > 0
            || self.intake.has_staged()
            || self.picking.is_some()
    }

    pub fn input_mut(&mut self) -> &mut WinitController {
        &mut self.input
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn lights(&self) -> &LightConfig {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightConfig {
        &mut self.lights
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn dolly(&self) -> &Dolly {
        &self.dolly
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    pub fn latest_load(&self) -> Option<LoadToken> {
        self.loader.latest()
    }

    pub fn loads_in_flight(&self) -> usize {
        self.loader.in_flight()
    }

    pub fn camera_position(&self) -> &DisplayedCameraPosition {
        self.reporter.displayed()
    }

    /// Last intake problem, cleared by the next successful selection
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Orbit/pan speeds are per viewport height, as in three.js OrbitControls
fn apply_input(
    camera: &mut OrbitCamera,
    controls: &ControlsConfig,
    input: FrameInput,
    viewport_height: f32,
) {
    let height = viewport_height.max(1.0);

    match input.drag {
        Some((DragMode::Orbit, dx, dy)) => {
            camera.orbit(
                dx / height * controls.rotate_speed,
                dy / height * controls.rotate_speed,
            );
        }
        Some((DragMode::Pan, dx, dy)) => {
            camera.pan(dx / height * controls.pan_speed, dy / height * controls.pan_speed);
        }
        None => {}
    }

    if input.scroll != 0.0 {
        camera.zoom(controls.zoom_speed.powf(input.scroll));
    }
}

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use glb_viewer::cli::Cli;
use glb_viewer::config::ViewerConfig;
use glb_viewer::core::{Button, Controller};
use glb_viewer::renderer::Renderer;
use glb_viewer::viewer::Viewer;

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    viewer: Viewer,
    /// Set while a load, the dolly or a file dialog needs more frames
    busy: bool,
}

impl App {
    fn new(viewer: Viewer) -> Self {
        Self {
            window: None,
            renderer: None,
            viewer,
            busy: false,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };

        self.busy = self.viewer.frame(renderer.size().height as f32);

        match renderer.render(window, &mut self.viewer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Skipping frame: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.viewer.config().window;
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(window_config.title.as_str())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    window_config.width,
                    window_config.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first. Button releases always reach the
        // camera controls so a drag ending over a panel does not stick.
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            let released = matches!(
                event,
                WindowEvent::MouseInput {
                    state: ElementState::Released,
                    ..
                }
            );
            if renderer.handle_event(window, &event) && !released {
                return;
            }
        }

        self.viewer.input_mut().process_event(&event);
        if self.viewer.input_mut().is_down(Button::Escape) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::DroppedFile(path) => {
                if let Err(e) = self.viewer.open_path(&path) {
                    log::warn!("Ignoring dropped file: {}", e);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        // Anything else may have changed the camera or the panels
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &self.renderer) else {
            return;
        };
        if self.busy || renderer.wants_repaint() {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ViewerConfig::from_cli(&cli)?;
    let mut viewer = Viewer::new(config);

    if let Some(path) = &cli.model {
        viewer.open_path(path)?;
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(viewer);

    log::info!("GLB Viewer - drag to orbit, right-drag to pan, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;
use crate::lights::LightConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GLB Viewer".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub position: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            position: [0.0, 0.0, 5.0],
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// How a loaded model is fitted and how the camera flies in to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Longest bounding-box side after rescaling
    pub target_size: f32,
    /// Multiplier on the exact fit distance
    pub fit_slack: f32,
    /// Fraction of the dolly covered per frame
    pub dolly_step: f32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_size: 2.0,
            fit_slack: 1.4,
            dolly_step: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Radians per window height of drag
    pub rotate_speed: f32,
    pub pan_speed: f32,
    /// Distance factor per wheel line
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: std::f32::consts::TAU,
            pan_speed: 1.0,
            zoom_speed: 0.95,
            min_distance: 0.05,
            max_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub normalize: NormalizeConfig,
    pub controls: ControlsConfig,
    pub lights: LightConfig,
    pub show_ui: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            normalize: NormalizeConfig::default(),
            controls: ControlsConfig::default(),
            lights: LightConfig::default(),
            show_ui: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: ViewerConfig =
            serde_json::from_str(json).context("Failed to parse viewer config")?;
        config.lights = config.lights.sanitized();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Defaults, then the config file if given, then CLI flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(fov) = cli.fov {
            config.camera.fov_degrees = fov;
        }
        if let Some(target_size) = cli.target_size {
            config.normalize.target_size = target_size;
        }
        if cli.no_ui {
            config.show_ui = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fov = self.camera.fov_degrees;
        ensure!(fov > 0.0 && fov < 180.0, "fov must be in (0, 180) degrees, got {}", fov);
        ensure!(
            self.camera.near > 0.0 && self.camera.far > self.camera.near,
            "camera clip planes must satisfy 0 < near < far"
        );
        let normalize = &self.normalize;
        ensure!(
            normalize.target_size.is_finite() && normalize.target_size > 0.0,
            "target_size must be positive, got {}",
            normalize.target_size
        );
        ensure!(normalize.fit_slack >= 1.0, "fit_slack must be at least 1");
        ensure!(
            normalize.dolly_step > 0.0 && normalize.dolly_step <= 1.0,
            "dolly_step must be in (0, 1]"
        );
        ensure!(
            self.controls.min_distance > 0.0
                && self.controls.max_distance > self.controls.min_distance,
            "controls need 0 < min_distance < max_distance"
        );
        Ok(())
    }
}

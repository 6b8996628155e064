// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "glb-viewer")]
#[command(about = "glTF/GLB model viewer", long_about = None)]
pub struct Cli {
    /// Model to open on startup (.glb or .gltf)
    pub model: Option<PathBuf>,

    /// JSON file overriding the default viewer settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub fov: Option<f32>,

    /// Length of the longest side of a loaded model after normalization
    #[arg(long = "target-size")]
    pub target_size: Option<f32>,

    /// Disable the control panels
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod dolly;
pub mod intake;
pub mod lights;
pub mod loader;
pub mod loaders;
pub mod math;
pub mod normalize;
pub mod renderer;
pub mod reporter;
pub mod scene;
pub mod ui;
pub mod viewer;

pub use config::ViewerConfig;
pub use loader::{LoadState, LoadToken, ModelLoader};
pub use viewer::Viewer;

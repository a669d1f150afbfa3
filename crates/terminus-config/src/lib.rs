//! Configuration for the Terminus planet viewer.
//!
//! Every tunable constant of the scene (camera, sphere radii, light
//! intensities, animation rates, asset file names) lives here and persists to
//! disk as a RON file. CLI flags override the loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, ArbitrationPolicy, AssetsConfig, CameraConfig, Config, DebugConfig,
    LightsConfig, RenderConfig, SceneConfig, ShellConfig, WindowConfig, default_config_dir,
};
pub use error::ConfigError;

//! Configuration sections with the scene's stock values and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Surface clear and tone mapping.
    pub render: RenderConfig,
    /// Perspective camera.
    pub camera: CameraConfig,
    /// Sphere meshes that make up the scene.
    pub scene: SceneConfig,
    /// Light sources.
    pub lights: LightsConfig,
    /// Per-tick animation rates and the cloud opacity model.
    pub animation: AnimationConfig,
    /// Texture files.
    pub assets: AssetsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
    /// Ask the compositor for a transparent window so the cleared alpha shows through.
    pub transparent: bool,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Clear color as RGBA in `[0, 1]`. Alpha 0 leaves the background transparent.
    pub clear_color: [f64; 4],
    /// Apply ACES filmic tone mapping to lit materials.
    pub tone_mapping: bool,
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// Tint the ambient light of lit materials by the environment map's mean radiance.
    pub environment_lighting: bool,
}

/// Perspective camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Camera position in world space. The camera looks down -Z.
    pub position: [f32; 3],
}

/// A sphere shell drawn with a flat translucent color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Horizontal and vertical segment count.
    pub segments: u32,
    /// sRGB color in `[0, 1]`.
    pub color: [f32; 3],
    /// Material opacity.
    pub opacity: f32,
}

/// Geometry of the scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Planet sphere radius.
    pub planet_radius: f32,
    /// Planet segment count (width and height).
    pub planet_segments: u32,
    /// Cloud shell radius, slightly above the planet.
    pub cloud_radius: f32,
    /// Cloud shell segment count.
    pub cloud_segments: u32,
    /// Atmosphere glow, rendered from the inside.
    pub planet_glow: ShellConfig,
    /// Sun marker that follows the pointer.
    pub sun: ShellConfig,
    /// Halo around the sun marker, rendered from the inside.
    pub sun_glow: ShellConfig,
    /// Distance along the pointer ray at which the light is placed.
    pub light_ray_distance: f32,
    /// Radius at which the directional light is parked along the light direction.
    pub directional_radius: f32,
}

/// Light source parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightsConfig {
    /// Ambient light color (sRGB).
    pub ambient_color: [f32; 3],
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Directional light color (sRGB).
    pub directional_color: [f32; 3],
    /// Directional light intensity.
    pub directional_intensity: f32,
    /// Directional light position before the first pointer event.
    pub directional_position: [f32; 3],
    /// Sun point light color (sRGB).
    pub sun_color: [f32; 3],
    /// Sun point light intensity.
    pub sun_intensity: f32,
    /// Sun point light cutoff distance (0 disables the cutoff).
    pub sun_distance: f32,
    /// Sun point light decay exponent.
    pub sun_decay: f32,
    /// Spot light color (sRGB).
    pub spot_color: [f32; 3],
    /// Spot light intensity.
    pub spot_intensity: f32,
    /// Spot light position. It is aimed at the origin.
    pub spot_position: [f32; 3],
    /// Spot cone half angle in radians.
    pub spot_angle: f32,
    /// Fraction of the cone that fades out at the rim, `[0, 1]`.
    pub spot_penumbra: f32,
    /// Spot light decay exponent.
    pub spot_decay: f32,
}

/// How the click-triggered fade and the per-tick oscillator share the cloud opacity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ArbitrationPolicy {
    /// The oscillator pauses while a fade runs and resumes from the fade target.
    #[default]
    SuspendOscillator,
    /// Both writers run every tick; the fade writes first and the oscillator last.
    LastWriterWins,
}

impl std::str::FromStr for ArbitrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "suspendoscillator" | "suspend" => Ok(Self::SuspendOscillator),
            "lastwriterwins" | "race" => Ok(Self::LastWriterWins),
            other => Err(format!("unknown arbitration policy '{other}'")),
        }
    }
}

/// Animation rates. All deltas are applied once per fixed tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Planet rotation increment per tick, radians, `[x, y]`.
    pub planet_rotation_step: [f32; 2],
    /// Cloud shell rotation increment per tick, radians, `[x, y]`.
    pub cloud_rotation_step: [f32; 2],
    /// Lower oscillation bound for cloud opacity.
    pub opacity_min: f32,
    /// Upper oscillation bound for cloud opacity.
    pub opacity_max: f32,
    /// Opacity change per tick.
    pub opacity_step: f32,
    /// Opacity at startup.
    pub initial_opacity: f32,
    /// Whether the oscillator starts by fading in.
    pub initial_fading_in: bool,
    /// Opacity reached by the click fade.
    pub fade_target: f32,
    /// Click fade duration in seconds.
    pub fade_duration_s: f64,
    /// Lerp factor applied to the smoothed pointer each tick.
    pub pointer_smoothing: f32,
    /// Pointer UV before the first pointer event.
    pub initial_pointer_uv: [f32; 2],
    /// Cloud opacity arbitration between fade and oscillator.
    pub arbitration: ArbitrationPolicy,
}

/// Texture asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory the file names below are resolved against.
    pub dir: PathBuf,
    /// Daylight color map.
    pub day: String,
    /// Grayscale displacement map.
    pub displacement: String,
    /// Cloud alpha map.
    pub clouds: String,
    /// Night lights map.
    pub night: String,
    /// Equirectangular HDR environment image.
    pub environment: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Terminus".to_string(),
            transparent: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            tone_mapping: true,
            exposure: 1.2,
            environment_lighting: false,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 2.0],
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 32,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
        }
    }
}

/// Converts a `0xRRGGBB` literal to sRGB floats.
fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            planet_radius: 0.75,
            planet_segments: 64,
            cloud_radius: 0.76,
            cloud_segments: 64,
            planet_glow: ShellConfig {
                radius: 0.4,
                segments: 64,
                color: hex_rgb(0x00aaff),
                opacity: 0.2,
            },
            sun: ShellConfig {
                radius: 0.05,
                segments: 16,
                color: hex_rgb(0xffcc00),
                opacity: 0.9,
            },
            sun_glow: ShellConfig {
                radius: 0.12,
                segments: 32,
                color: hex_rgb(0xffee88),
                opacity: 0.1,
            },
            light_ray_distance: 1.0,
            directional_radius: 5.0,
        }
    }
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.4,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 0.8,
            directional_position: [2.0, 2.0, 5.0],
            sun_color: hex_rgb(0xffcc00),
            sun_intensity: 1.5,
            sun_distance: 10.0,
            sun_decay: 2.0,
            spot_color: [1.0, 1.0, 1.0],
            spot_intensity: 1.0,
            spot_position: [0.0, 3.0, 3.0],
            spot_angle: std::f32::consts::FRAC_PI_3,
            spot_penumbra: 0.0,
            spot_decay: 2.0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            planet_rotation_step: [0.002, 0.005],
            cloud_rotation_step: [0.002, 0.003],
            opacity_min: 0.1,
            opacity_max: 0.3,
            opacity_step: 0.001,
            initial_opacity: 0.2,
            initial_fading_in: true,
            fade_target: 0.4,
            fade_duration_s: 1.0,
            pointer_smoothing: 0.1,
            initial_pointer_uv: [0.5, 0.5],
            arbitration: ArbitrationPolicy::SuspendOscillator,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            day: "image.jpg".to_string(),
            displacement: "displacement-map.jpg".to_string(),
            clouds: "clouds.png".to_string(),
            night: "nightlights.png".to_string(),
            environment: "env.hdr".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AssetsConfig {
    /// Full path of one of the configured asset files.
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

/// Per-user config directory, e.g. `~/.config/terminus` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("terminus"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_scene() {
        let config = Config::default();
        assert_eq!(config.camera.fov_y_degrees, 75.0);
        assert_eq!(config.camera.position, [0.0, 0.0, 2.0]);
        assert_eq!(config.scene.planet_radius, 0.75);
        assert_eq!(config.scene.cloud_radius, 0.76);
        assert_eq!(config.animation.opacity_min, 0.1);
        assert_eq!(config.animation.opacity_max, 0.3);
        assert_eq!(config.animation.fade_target, 0.4);
        assert_eq!(config.render.clear_color[3], 0.0);
        assert!((config.render.exposure - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hex_rgb_channels() {
        assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
        let sun = hex_rgb(0xffcc00);
        assert_eq!(sun[0], 1.0);
        assert!((sun[1] - 0.8).abs() < 1e-6);
        assert_eq!(sun[2], 0.0);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("arbitration: SuspendOscillator"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.animation.arbitration = ArbitrationPolicy::LastWriterWins;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(window: (width: 800))").unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.lights, LightsConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(shadows: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.assets.dir = PathBuf::from("/srv/planet");
        config.animation.fade_duration_s = 2.5;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_arbitration_policy_from_str() {
        assert_eq!(
            "suspend-oscillator".parse::<ArbitrationPolicy>(),
            Ok(ArbitrationPolicy::SuspendOscillator)
        );
        assert_eq!(
            "LastWriterWins".parse::<ArbitrationPolicy>(),
            Ok(ArbitrationPolicy::LastWriterWins)
        );
        assert!("sometimes".parse::<ArbitrationPolicy>().is_err());
    }

    #[test]
    fn test_asset_path_joins_dir() {
        let assets = AssetsConfig::default();
        assert_eq!(assets.path(&assets.day), PathBuf::from("assets/image.jpg"));
    }
}

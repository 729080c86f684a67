//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Application name used for the per-user configuration directory.
const APP_NAME: &str = "curve";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera and follow-control settings.
    pub camera: CameraConfig,
    /// Body tessellation and hysteresis settings.
    pub lod: LodConfig,
    /// Physics cadence and world-to-render scale.
    pub simulation: SimulationConfig,
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
    /// Window title.
    pub title: String,
}

/// Camera configuration. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial vertical field of view.
    pub fov: f32,
    /// Near clip plane in render units.
    pub near: f32,
    /// Lower zoom bound.
    pub min_fov: f32,
    /// Upper zoom bound.
    pub max_fov: f32,
    /// Translation speed in world units per second.
    pub move_speed: f32,
    /// Mouse-look sensitivity in degrees per pixel.
    pub mouse_sensitivity: f32,
    /// Held-key rotation speed in degrees per second.
    pub key_rotation_speed: f32,
    /// Held-key zoom speed in degrees per second.
    pub key_zoom_speed: f32,
}

/// Level-of-detail configuration for body meshes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Segment count used when a body is far away.
    pub default_segments: u32,
    /// Segment ceiling, also used when the camera is inside a body.
    pub max_segments: u32,
    /// Near-plane distance assumed by the angular-size projection.
    pub projection_near: f64,
    /// Field of view (degrees) assumed by the angular-size projection.
    pub projection_fov: f64,
    /// Render units the camera must approach before geometry is rebuilt.
    pub hysteresis_closer: f64,
    /// Render units the camera must recede before geometry is rebuilt.
    pub hysteresis_farther: f64,
}

/// Physics cadence and coordinate scaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed physics tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// World-to-render divisor.
    pub position_scale: f64,
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
            width: 800,
            height: 600,
            title: "Curve".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.01,
            min_fov: 10.0,
            max_fov: 100.0,
            move_speed: 1.0e6,
            mouse_sensitivity: 0.1,
            key_rotation_speed: 30.0,
            key_zoom_speed: 5.0,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            default_segments: 16,
            max_segments: 512,
            projection_near: 0.01,
            projection_fov: 60.0,
            hysteresis_closer: 50.0,
            hysteresis_farther: 100.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            position_scale: 8_388_608.0,
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

// --- Validation ---

impl Config {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if !(self.simulation.position_scale.is_finite() && self.simulation.position_scale > 0.0) {
            return Err(invalid("simulation.position_scale", "must be positive"));
        }
        if self.simulation.tick_interval_ms == 0 {
            return Err(invalid("simulation.tick_interval_ms", "must be non-zero"));
        }
        if self.camera.min_fov > self.camera.max_fov {
            return Err(invalid("camera.min_fov", "must not exceed camera.max_fov"));
        }
        if self.lod.default_segments == 0 || self.lod.default_segments > self.lod.max_segments {
            return Err(invalid(
                "lod.default_segments",
                "must be non-zero and not exceed lod.max_segments",
            ));
        }
        if !(self.lod.projection_near.is_finite() && self.lod.projection_near > 0.0) {
            return Err(invalid("lod.projection_near", "must be positive"));
        }
        if !(self.lod.projection_fov > 0.0 && self.lod.projection_fov < 180.0) {
            return Err(invalid("lod.projection_fov", "must lie strictly between 0 and 180"));
        }
        if self.lod.hysteresis_closer < 0.0 || self.lod.hysteresis_farther < 0.0 {
            return Err(invalid("lod.hysteresis", "thresholds must be non-negative"));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// The per-user configuration directory, e.g. `~/.config/curve`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
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

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
    /// Texture atlas settings.
    pub atlas: AtlasConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation settings.
///
/// The grid and scale values are used both for mesh generation and for every
/// later height query against the same terrain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Path to the 8-bit grayscale heightmap.
    pub heightmap: PathBuf,
    /// Grid stride in raster pixels.
    pub step_size: u32,
    /// World units per canonical elevation unit.
    pub height_scale: f32,
    /// World units per raster pixel along X and Z.
    pub scale_xz: f32,
    /// Enable the contrast-enhancement stage.
    pub contrast: bool,
    /// Contrast multiplier applied around mid-grey.
    pub contrast_factor: f32,
    /// Gamma exponent applied after contrast (< 1 sharpens transitions).
    pub gamma: f32,
    /// Enable terrace quantization.
    pub quantize: bool,
    /// Number of discrete elevation levels (>= 2).
    pub levels: u32,
    /// Mesh builder worker threads (0 = one per logical CPU, 1 = serial).
    pub worker_threads: usize,
}

/// Texture atlas layout and optional band table override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    /// Tiles along the U axis.
    pub tiles_per_row: u32,
    /// Tiles along the V axis.
    pub tiles_per_column: u32,
    /// RON file describing elevation bands; `None` uses the built-in table.
    pub bands: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs next to the config file in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("resources/textures/heights.png"),
            step_size: 30,
            height_scale: 0.5,
            scale_xz: 1.0 / 20.0,
            contrast: true,
            contrast_factor: 2.5,
            gamma: 0.7,
            quantize: true,
            levels: 16,
            worker_threads: 0,
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            tiles_per_row: 16,
            tiles_per_column: 16,
            bands: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

/// Platform configuration directory for Strata.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
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
    ///
    /// A changed terrain section only takes effect by building a new terrain.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

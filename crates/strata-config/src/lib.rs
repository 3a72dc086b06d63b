//! Configuration system for Strata terrain tools.
//!
//! Provides runtime-configurable terrain generation settings that persist to disk
//! as RON files. Supports CLI overrides via clap, hot-reload detection, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, parse_probe};
pub use config::{AtlasConfig, Config, DebugConfig, TerrainConfig, default_config_dir};
pub use error::ConfigError;

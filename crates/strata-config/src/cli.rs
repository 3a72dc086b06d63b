//! Command-line argument parsing for Strata.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Heightmap terrain generator")]
pub struct CliArgs {
    /// Heightmap image path.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Grid stride in raster pixels.
    #[arg(long)]
    pub step_size: Option<u32>,

    /// World units per canonical elevation unit.
    #[arg(long)]
    pub height_scale: Option<f32>,

    /// World units per raster pixel along X and Z.
    #[arg(long)]
    pub scale_xz: Option<f32>,

    /// Number of terrace levels.
    #[arg(long)]
    pub levels: Option<u32>,

    /// Disable the contrast-enhancement stage.
    #[arg(long)]
    pub no_contrast: bool,

    /// Disable terrace quantization.
    #[arg(long)]
    pub no_quantize: bool,

    /// Mesh builder worker threads (0 = all cores).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// World-space point to probe, as `X,Z`. May be repeated.
    #[arg(long = "probe", value_parser = parse_probe)]
    pub probes: Vec<(f32, f32)>,
}

/// Parse a `X,Z` pair of world coordinates.
pub fn parse_probe(value: &str) -> Result<(f32, f32), String> {
    let (x, z) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z but got `{value}`"))?;
    let x = x
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid X in `{value}`: {e}"))?;
    let z = z
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid Z in `{value}`: {e}"))?;
    Ok((x, z))
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.heightmap {
            self.terrain.heightmap = path.clone();
        }
        if let Some(step) = args.step_size {
            self.terrain.step_size = step;
        }
        if let Some(scale) = args.height_scale {
            self.terrain.height_scale = scale;
        }
        if let Some(scale) = args.scale_xz {
            self.terrain.scale_xz = scale;
        }
        if let Some(levels) = args.levels {
            self.terrain.levels = levels;
        }
        if args.no_contrast {
            self.terrain.contrast = false;
        }
        if args.no_quantize {
            self.terrain.quantize = false;
        }
        if let Some(workers) = args.workers {
            self.terrain.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            step_size: Some(4),
            heightmap: Some(PathBuf::from("flat.png")),
            no_quantize: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.step_size, 4);
        assert_eq!(config.terrain.heightmap, PathBuf::from("flat.png"));
        assert!(!config.terrain.quantize);
        // Non-overridden fields retain defaults
        assert!(config.terrain.contrast);
        assert_eq!(config.terrain.levels, 16);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_args_from_command_line() {
        let args = CliArgs::try_parse_from([
            "strata",
            "--step-size",
            "2",
            "--no-contrast",
            "--probe",
            "1.5,-2",
            "--probe",
            "0,0",
        ])
        .unwrap();
        assert_eq!(args.step_size, Some(2));
        assert!(args.no_contrast);
        assert_eq!(args.probes, vec![(1.5, -2.0), (0.0, 0.0)]);
    }

    #[test]
    fn test_parse_probe_rejects_garbage() {
        assert!(parse_probe("12").is_err());
        assert!(parse_probe("a,1").is_err());
        assert_eq!(parse_probe(" 3 , 4 ").unwrap(), (3.0, 4.0));
    }
}

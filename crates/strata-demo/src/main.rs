//! Demo binary that builds a heightmap terrain and probes its surface.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo` to build the default heightmap.
//! Run with `cargo run -p strata-demo -- --heightmap hills.png --step-size 4 --probe 0,0`
//! to sample heights at chosen world points.

use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;
use strata_config::{AtlasConfig, CliArgs, Config, ConfigError, TerrainConfig, default_config_dir};
use strata_mesh::TerrainVertex;
use strata_terrain::{
    AtlasLayout, BandTable, BandTableError, ContrastParams, NormalizationParams, Raster,
    Terrain, TerrainError, TerrainParams,
};
use tracing::{error, info, warn};

/// Height above the surface at which probe objects are placed.
const PROBE_CLEARANCE: f32 = 0.1;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bands(#[from] BandTableError),

    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, &args.probes) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("strata: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, probes: &[(f32, f32)]) -> Result<(), DemoError> {
    let params = terrain_params(&config.terrain);
    let bands = band_table(&config.atlas)?;

    info!(
        heightmap = %config.terrain.heightmap.display(),
        step = params.step_size,
        height_scale = params.height_scale,
        scale_xz = params.scale_xz,
        "Building terrain"
    );
    let raster = Raster::load(&config.terrain.heightmap)?;
    let terrain = Terrain::with_bands(raster, params, bands)?;

    report_mesh(&terrain);
    report_probes(&terrain, probes);
    Ok(())
}

/// Map the persisted terrain settings onto generation parameters.
fn terrain_params(config: &TerrainConfig) -> TerrainParams {
    let contrast = config.contrast.then_some(ContrastParams {
        factor: config.contrast_factor,
        gamma: config.gamma,
    });
    TerrainParams {
        step_size: config.step_size,
        height_scale: config.height_scale,
        scale_xz: config.scale_xz,
        normalization: NormalizationParams {
            contrast,
            levels: config.quantize.then_some(config.levels),
        },
        worker_threads: config.worker_threads,
    }
}

/// The configured band table, or the built-in one on the configured atlas grid.
fn band_table(config: &AtlasConfig) -> Result<BandTable, BandTableError> {
    let layout = AtlasLayout {
        tiles_per_row: config.tiles_per_row,
        tiles_per_column: config.tiles_per_column,
    };
    match &config.bands {
        Some(path) => {
            let table = BandTable::load(path)?;
            if *table.atlas() != layout {
                warn!(
                    path = %path.display(),
                    "Band table declares its own atlas layout; ignoring [atlas] grid"
                );
            }
            info!(path = %path.display(), bands = table.bands().len(), "Loaded band table");
            Ok(table)
        }
        None => BandTable::default().with_atlas(layout),
    }
}

fn report_mesh(terrain: &Terrain) {
    let mesh = terrain.mesh();
    info!(
        quads = mesh.quad_count(),
        triangles = mesh.triangle_count(),
        vertex_bytes = mesh.vertex_bytes().len(),
        index_bytes = mesh.index_bytes().len(),
        stride = std::mem::size_of::<TerrainVertex>(),
        "Terrain mesh ready"
    );
    match terrain.bounds() {
        Some(bounds) => info!(
            "Bounds: min {:?}, max {:?}, centre {:?}",
            bounds.min,
            bounds.max,
            bounds.center()
        ),
        None => warn!("Terrain mesh is empty; nothing to render"),
    }
}

fn report_probes(terrain: &Terrain, probes: &[(f32, f32)]) {
    let origin = [(0.0, 0.0)];
    let probes = if probes.is_empty() { &origin[..] } else { probes };

    for &(x, z) in probes {
        let height = terrain.height_at(x, z);
        let placed = terrain.place_on_surface(Vec3::new(x, 0.0, z), PROBE_CLEARANCE);
        if terrain.contains(x, z) {
            info!("Height at ({x}, {z}): {height:.4}, object placed at {placed}");
        } else {
            warn!("({x}, {z}) is off the heightmap; clamped height {height:.4}");
        }
    }
}

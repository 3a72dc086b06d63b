//! The terrain aggregate: one raster, one sampling configuration, one mesh.

use std::path::Path;
use std::time::Instant;

use glam::Vec3;
use strata_mesh::{MeshBounds, TerrainMesh};

use crate::bands::BandTable;
use crate::builder::MeshBuilder;
use crate::error::TerrainError;
use crate::grid::GridTransform;
use crate::normalize::{HeightNormalizer, NormalizationContext, NormalizationParams};
use crate::query::HeightQuery;
use crate::raster::Raster;

/// Generation parameters. Fixed for the lifetime of a [`Terrain`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    /// Grid stride in raster pixels. Must be > 0.
    pub step_size: u32,
    /// World units per canonical elevation unit.
    pub height_scale: f32,
    /// World units per raster pixel along X and Z.
    pub scale_xz: f32,
    /// Contrast and quantization stages.
    pub normalization: NormalizationParams,
    /// Mesh builder threads; 0 uses one per logical CPU.
    pub worker_threads: usize,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            step_size: 30,
            height_scale: 0.5,
            scale_xz: 1.0 / 20.0,
            normalization: NormalizationParams::default(),
            worker_threads: 0,
        }
    }
}

/// A heightmap terrain, built once and queried many times.
///
/// Owns the raster and the single [`HeightNormalizer`] / [`GridTransform`]
/// pair that both mesh generation and [`Terrain::height_at`] read, so queries
/// always agree with the generated geometry. Immutable after construction and
/// safe to query from any number of threads.
#[derive(Debug)]
pub struct Terrain {
    raster: Raster,
    normalizer: HeightNormalizer,
    grid: GridTransform,
    bands: BandTable,
    params: TerrainParams,
    mesh: TerrainMesh,
}

impl Terrain {
    /// Load a heightmap from disk and build the terrain with the default band table.
    pub fn load(path: impl AsRef<Path>, params: TerrainParams) -> Result<Self, TerrainError> {
        Self::from_raster(Raster::load(path)?, params)
    }

    /// Build from an in-memory raster with the default band table.
    pub fn from_raster(raster: Raster, params: TerrainParams) -> Result<Self, TerrainError> {
        Self::with_bands(raster, params, BandTable::default())
    }

    /// Build from an in-memory raster and a custom band table.
    pub fn with_bands(
        raster: Raster,
        params: TerrainParams,
        bands: BandTable,
    ) -> Result<Self, TerrainError> {
        params.normalization.validate()?;
        let grid = GridTransform::new(
            raster.cols(),
            raster.rows(),
            params.step_size,
            params.scale_xz,
            params.height_scale,
        )?;

        let context = NormalizationContext::from_raster(&raster);
        if context.min() == context.max() {
            tracing::warn!(value = context.min(), "Heightmap is flat; terrain will be level");
        }
        tracing::info!(
            min = context.min(),
            max = context.max(),
            denom = context.denom(),
            "Heightmap range"
        );
        let normalizer = HeightNormalizer::new(context, params.normalization);

        let workers = resolve_workers(params.worker_threads);
        let start = Instant::now();
        let mesh = MeshBuilder::new(&raster, &normalizer, &grid, &bands).build_parallel(workers);

        if mesh.is_empty() {
            tracing::warn!(
                cols = raster.cols(),
                rows = raster.rows(),
                step = params.step_size,
                "Heightmap is not larger than one step; mesh is empty"
            );
        }
        tracing::info!(
            quads = mesh.quad_count(),
            vertices = mesh.vertices.len(),
            indices = mesh.indices.len(),
            workers,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Built terrain mesh"
        );

        Ok(Self {
            raster,
            normalizer,
            grid,
            bands,
            params,
            mesh,
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn grid(&self) -> &GridTransform {
        &self.grid
    }

    pub fn normalizer(&self) -> &HeightNormalizer {
        &self.normalizer
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// World-space bounds of the generated mesh.
    pub fn bounds(&self) -> Option<MeshBounds> {
        self.mesh.bounds()
    }

    /// Query handle sharing this terrain's sampling state.
    pub fn query(&self) -> HeightQuery<'_> {
        HeightQuery::new(&self.raster, &self.normalizer, &self.grid)
    }

    /// Terrain elevation at world `(x, z)`.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        self.query().height_at(world_x, world_z)
    }

    /// `position` moved onto the surface, `clearance` units above it.
    pub fn place_on_surface(&self, position: Vec3, clearance: f32) -> Vec3 {
        self.query().place_on_surface(position, clearance)
    }

    /// Whether `(x, z)` lies over the heightmap.
    pub fn contains(&self, world_x: f32, world_z: f32) -> bool {
        self.grid.contains(world_x, world_z)
    }
}

fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

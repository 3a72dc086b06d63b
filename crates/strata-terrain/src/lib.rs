//! Heightmap terrain: raster sampling, height normalization, mesh generation, and
//! height queries that agree with the generated geometry.

mod bands;
mod builder;
mod error;
mod grid;
mod normalize;
mod query;
mod raster;
mod terrain;

pub use bands::{AtlasLayout, AtlasTile, BandTable, BandTableError, HeightBand};
pub use builder::MeshBuilder;
pub use error::TerrainError;
pub use grid::GridTransform;
pub use normalize::{
    ContrastParams, HeightNormalizer, NormalizationContext, NormalizationParams,
    RANGE_EPSILON, enhance_contrast, level_to_canonical, quantize_level,
};
pub use query::HeightQuery;
pub use raster::Raster;
pub use terrain::{Terrain, TerrainParams};

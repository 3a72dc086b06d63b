//! Terrain construction errors.

use std::path::PathBuf;

use crate::bands::BandTableError;

/// Errors that abort terrain construction.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The heightmap file is missing, unreadable, or not a decodable image.
    #[error("failed to load heightmap {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The raster has zero columns or zero rows.
    #[error("heightmap is empty ({cols}x{rows})")]
    EmptyRaster { cols: usize, rows: usize },

    /// Raw sample data does not match the declared raster dimensions.
    #[error("raster data holds {len} samples, expected {cols}x{rows}")]
    DimensionMismatch { cols: usize, rows: usize, len: usize },

    /// Generation parameters are out of range.
    #[error("invalid terrain parameters: {0}")]
    InvalidParams(String),

    /// The elevation band table is malformed.
    #[error(transparent)]
    Bands(#[from] BandTableError),
}

//! Elevation bands: which atlas tile textures a quad at a given height.
//!
//! A [`BandTable`] is an ordered list of thresholds over the `[0, 1]` band
//! height. The first band whose threshold the height exceeds wins, so the table
//! must be sorted by strictly descending threshold and its last threshold must
//! lie below zero to catch everything else.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Errors returned when building or loading a band table.
#[derive(Debug, thiserror::Error)]
pub enum BandTableError {
    /// No bands were given.
    #[error("band table is empty")]
    Empty,

    /// Thresholds are not strictly descending.
    #[error("band `{name}` threshold {threshold} is not below the previous band's")]
    UnorderedThresholds { name: String, threshold: f32 },

    /// The last band does not catch every height in `[0, 1]`.
    #[error("last band `{name}` threshold {threshold} must be below 0")]
    NotExhaustive { name: String, threshold: f32 },

    /// A band references a tile outside the atlas grid.
    #[error("band `{name}` tile ({column}, {row}) is outside the {tiles_per_row}x{tiles_per_column} atlas")]
    TileOutOfAtlas {
        name: String,
        column: u32,
        row: u32,
        tiles_per_row: u32,
        tiles_per_column: u32,
    },

    /// Failed to read a band table file.
    #[error("failed to read band table: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse band table: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// A tile position in the atlas grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasTile {
    pub column: u32,
    pub row: u32,
}

impl AtlasTile {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Grid layout of the tile atlas texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub tiles_per_row: u32,
    pub tiles_per_column: u32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            tiles_per_row: 16,
            tiles_per_column: 16,
        }
    }
}

impl AtlasLayout {
    /// Size of one tile in UV units.
    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(
            1.0 / self.tiles_per_row as f32,
            1.0 / self.tiles_per_column as f32,
        )
    }

    pub fn contains(&self, tile: AtlasTile) -> bool {
        tile.column < self.tiles_per_row && tile.row < self.tiles_per_column
    }

    /// UV of the tile's minimum corner.
    pub fn tile_origin(&self, tile: AtlasTile) -> Vec2 {
        Vec2::new(tile.column as f32, tile.row as f32) * self.tile_size()
    }

    /// UVs for quad corners p0, p1, p2, p3 (origin, +U, +U+V, +V).
    pub fn uv_rect(&self, tile: AtlasTile) -> [Vec2; 4] {
        let origin = self.tile_origin(tile);
        let size = self.tile_size();
        [
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ]
    }
}

/// One elevation band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightBand {
    /// Human-readable band name (e.g., "snow").
    pub name: String,
    /// Heights strictly above this value fall in the band (unless an earlier band matched).
    pub threshold: f32,
    /// Atlas tile used by quads in this band.
    pub tile: AtlasTile,
}

impl HeightBand {
    pub fn new(name: impl Into<String>, threshold: f32, tile: AtlasTile) -> Self {
        Self {
            name: name.into(),
            threshold,
            tile,
        }
    }
}

#[derive(Deserialize)]
struct BandTableFile {
    #[serde(default)]
    atlas: AtlasLayout,
    bands: Vec<HeightBand>,
}

/// Validated, ordered band table bound to an atlas layout.
#[derive(Clone, Debug, PartialEq)]
pub struct BandTable {
    atlas: AtlasLayout,
    bands: Vec<HeightBand>,
}

impl Default for BandTable {
    /// Snow, dark rock, rock, soil, and grass on a 16×16 atlas.
    fn default() -> Self {
        Self {
            atlas: AtlasLayout::default(),
            bands: vec![
                HeightBand::new("snow", 0.9, AtlasTile::new(0, 4)),
                HeightBand::new("dark_rock", 0.8, AtlasTile::new(5, 2)),
                HeightBand::new("rock", 0.5, AtlasTile::new(0, 1)),
                HeightBand::new("soil", 0.3, AtlasTile::new(2, 0)),
                HeightBand::new("grass", -1.0, AtlasTile::new(0, 0)),
            ],
        }
    }
}

impl BandTable {
    pub fn new(atlas: AtlasLayout, bands: Vec<HeightBand>) -> Result<Self, BandTableError> {
        let last = bands.last().ok_or(BandTableError::Empty)?;
        if last.threshold >= 0.0 || last.threshold.is_nan() {
            return Err(BandTableError::NotExhaustive {
                name: last.name.clone(),
                threshold: last.threshold,
            });
        }
        if let Some(band) = bands.iter().find(|b| b.threshold.is_nan()) {
            return Err(BandTableError::UnorderedThresholds {
                name: band.name.clone(),
                threshold: band.threshold,
            });
        }
        for pair in bands.windows(2) {
            if pair[1].threshold >= pair[0].threshold {
                return Err(BandTableError::UnorderedThresholds {
                    name: pair[1].name.clone(),
                    threshold: pair[1].threshold,
                });
            }
        }
        if let Some(band) = bands.iter().find(|b| !atlas.contains(b.tile)) {
            return Err(BandTableError::TileOutOfAtlas {
                name: band.name.clone(),
                column: band.tile.column,
                row: band.tile.row,
                tiles_per_row: atlas.tiles_per_row,
                tiles_per_column: atlas.tiles_per_column,
            });
        }
        Ok(Self { atlas, bands })
    }

    /// Parse a table from RON, e.g. `(atlas: (tiles_per_row: 8, tiles_per_column: 8), bands: [...])`.
    pub fn from_ron(source: &str) -> Result<Self, BandTableError> {
        let file: BandTableFile = ron::from_str(source)?;
        Self::new(file.atlas, file.bands)
    }

    /// Read and parse a RON table file.
    pub fn load(path: &Path) -> Result<Self, BandTableError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }

    /// Same bands on a different atlas grid.
    pub fn with_atlas(self, atlas: AtlasLayout) -> Result<Self, BandTableError> {
        Self::new(atlas, self.bands)
    }

    pub fn atlas(&self) -> &AtlasLayout {
        &self.atlas
    }

    pub fn bands(&self) -> &[HeightBand] {
        &self.bands
    }

    /// Band for a height in `[0, 1]`.
    pub fn select(&self, height: f32) -> &HeightBand {
        let fallback = &self.bands[self.bands.len() - 1];
        self.bands
            .iter()
            .find(|band| height > band.threshold)
            .unwrap_or(fallback)
    }

    /// Corner UVs for the band selected by `height`.
    pub fn uv_rect(&self, height: f32) -> [Vec2; 4] {
        self.atlas.uv_rect(self.select(height).tile)
    }
}

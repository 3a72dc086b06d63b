//! Mapping between raster pixels and world space.
//!
//! The grid is centred on the world origin: pixel `(col, row)` lands at
//! `((col - x_offset) * scale_xz, (row - z_offset) * scale_xz)` with
//! `x_offset = (cols - step) / 2` and `z_offset = (rows - step) / 2`.

use glam::{Vec2, Vec3};

use crate::error::TerrainError;

/// Raster ↔ world transform plus the cell stride, shared by mesh generation
/// and height queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    cols: usize,
    rows: usize,
    step: usize,
    scale_xz: f32,
    height_scale: f32,
    x_offset: f32,
    z_offset: f32,
}

impl GridTransform {
    /// # Errors
    ///
    /// [`TerrainError::InvalidParams`] for a zero step, a non-positive or
    /// non-finite `scale_xz`, or a non-finite `height_scale`.
    pub fn new(
        cols: usize,
        rows: usize,
        step_size: u32,
        scale_xz: f32,
        height_scale: f32,
    ) -> Result<Self, TerrainError> {
        if step_size == 0 {
            return Err(TerrainError::InvalidParams(
                "step_size must be greater than 0".to_string(),
            ));
        }
        if !scale_xz.is_finite() || scale_xz <= 0.0 {
            return Err(TerrainError::InvalidParams(format!(
                "scale_xz must be finite and positive, got {scale_xz}"
            )));
        }
        if !height_scale.is_finite() {
            return Err(TerrainError::InvalidParams(format!(
                "height_scale must be finite, got {height_scale}"
            )));
        }

        let step = step_size as usize;
        Ok(Self {
            cols,
            rows,
            step,
            scale_xz,
            height_scale,
            x_offset: (cols as f32 - step as f32) / 2.0,
            z_offset: (rows as f32 - step as f32) / 2.0,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn scale_xz(&self) -> f32 {
        self.scale_xz
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Centering offset in pixels, `(x_offset, z_offset)`.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x_offset, self.z_offset)
    }

    /// Columns at which a cell starts: multiples of the step in `[0, cols - step)`.
    pub fn cell_columns(&self) -> impl Iterator<Item = usize> + Clone + use<> {
        (0..self.cols.saturating_sub(self.step)).step_by(self.step)
    }

    /// Rows at which a cell starts: multiples of the step in `[0, rows - step)`.
    pub fn cell_rows(&self) -> impl Iterator<Item = usize> + Clone + use<> {
        (0..self.rows.saturating_sub(self.step)).step_by(self.step)
    }

    /// Number of cells along X and Z.
    pub fn cell_counts(&self) -> (usize, usize) {
        let count = |len: usize| {
            if len > self.step {
                (len - 1) / self.step
            } else {
                0
            }
        };
        (count(self.cols), count(self.rows))
    }

    /// World-space X/Z of a pixel.
    pub fn world_xz(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(
            (col as f32 - self.x_offset) * self.scale_xz,
            (row as f32 - self.z_offset) * self.scale_xz,
        )
    }

    /// World-space position of a pixel with the given canonical elevation.
    pub fn to_world(&self, col: usize, row: usize, canonical: f32) -> Vec3 {
        let xz = self.world_xz(col, row);
        Vec3::new(xz.x, canonical * self.height_scale, xz.y)
    }

    /// Continuous raster coordinates of a world point.
    pub fn raster_coords(&self, world_x: f32, world_z: f32) -> Vec2 {
        Vec2::new(
            world_x / self.scale_xz + self.x_offset,
            world_z / self.scale_xz + self.z_offset,
        )
    }

    /// Nearest pixel to a world point, not clamped.
    pub fn nearest_pixel(&self, world_x: f32, world_z: f32) -> (i64, i64) {
        let coords = self.raster_coords(world_x, world_z).round();
        (coords.x as i64, coords.y as i64)
    }

    /// Whether a world point's nearest pixel lies inside the raster.
    pub fn contains(&self, world_x: f32, world_z: f32) -> bool {
        let (col, row) = self.nearest_pixel(world_x, world_z);
        (0..self.cols as i64).contains(&col) && (0..self.rows as i64).contains(&row)
    }
}

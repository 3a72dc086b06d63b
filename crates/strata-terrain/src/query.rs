//! World-space height lookup that matches the generated mesh.

use glam::Vec3;

use crate::grid::GridTransform;
use crate::normalize::HeightNormalizer;
use crate::raster::Raster;

/// Point height queries against a built terrain.
///
/// Borrows the same raster, normalizer, and grid the mesh builder used, so a
/// query at a vertex's X/Z returns that vertex's Y. Off-map points clamp to the
/// nearest edge pixel.
#[derive(Clone, Copy)]
pub struct HeightQuery<'a> {
    raster: &'a Raster,
    normalizer: &'a HeightNormalizer,
    grid: &'a GridTransform,
}

impl<'a> HeightQuery<'a> {
    pub fn new(
        raster: &'a Raster,
        normalizer: &'a HeightNormalizer,
        grid: &'a GridTransform,
    ) -> Self {
        Self {
            raster,
            normalizer,
            grid,
        }
    }

    /// Terrain elevation at world `(x, z)`.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let (col, row) = self.grid.nearest_pixel(world_x, world_z);
        let raw = self.raster.clamped_sample(col, row);
        self.normalizer.canonical(raw) * self.grid.height_scale()
    }

    /// `position` moved onto the surface, `clearance` units above it.
    pub fn place_on_surface(&self, position: Vec3, clearance: f32) -> Vec3 {
        Vec3::new(
            position.x,
            self.height_at(position.x, position.z) + clearance,
            position.z,
        )
    }

    /// Whether `(x, z)` lies over the raster rather than being clamped onto its edge.
    pub fn contains(&self, world_x: f32, world_z: f32) -> bool {
        self.grid.contains(world_x, world_z)
    }
}

//! Interleaved terrain vertex, laid out for direct GPU upload.

use glam::{Vec2, Vec3};

/// A single terrain vertex.
///
/// Layout (32 bytes total):
///   - `[0..12]`  position `[f32; 3]` in world space
///   - `[12..24]` normal `[f32; 3]`, unit length
///   - `[24..32]` uv `[f32; 2]` into the tile atlas
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Shading normal.
    pub normal: [f32; 3],
    /// Atlas texture coordinates.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

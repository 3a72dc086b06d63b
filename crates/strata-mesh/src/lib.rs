//! Terrain mesh data: interleaved vertices, triangle indices, and the GPU vertex layout.

pub mod terrain_mesh;
pub mod vertex;
pub mod vertex_format;

pub use terrain_mesh::{MeshBounds, TerrainMesh};
pub use vertex::TerrainVertex;
pub use vertex_format::{
    TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT, terrain_vertex_buffer_layout,
};

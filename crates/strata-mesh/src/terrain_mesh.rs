//! Terrain mesh data structure holding the vertices and indices produced by the mesh builder.

use glam::Vec3;

use crate::vertex::TerrainVertex;

/// Axis-aligned bounds of a mesh in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl MeshBounds {
    /// Centre point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Flat vertex/index output of a terrain meshing pass.
///
/// Every quad owns its four vertices; corners shared between neighbouring
/// quads are duplicated. Indices form a triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    /// Vertex buffer.
    pub vertices: Vec<TerrainVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with room for `quads` quads.
    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Pushes one quad given its corners in order p0, p1, p2, p3.
    ///
    /// p0 → p1 runs along +X and p0 → p3 along +Z. The quad is emitted as
    /// triangles `(2, 1, 0)` and `(3, 2, 0)` relative to its first vertex,
    /// which is counter-clockwise when seen from +Y.
    pub fn push_quad(&mut self, corners: [TerrainVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend_from_slice(&[
            base + 2,
            base + 1,
            base,
            base + 3,
            base + 2,
            base,
        ]);
    }

    /// Appends `other`, rebasing its indices onto this mesh's vertices.
    pub fn append(&mut self, other: TerrainMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Returns the number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates the triangles as vertex triples in emitted order.
    pub fn triangles(&self) -> impl Iterator<Item = [&TerrainVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }

    /// World-space bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<MeshBounds> {
        let first = self.vertices.first()?.position();
        let (min, max) = self
            .vertices
            .iter()
            .map(TerrainVertex::position)
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(MeshBounds { min, max })
    }

    /// Raw vertex bytes for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for buffer upload (`u32` indices).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

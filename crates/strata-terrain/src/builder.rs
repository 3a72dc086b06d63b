//! Full-grid triangulation of a raster.
//!
//! Each cell of the stride grid becomes one quad with corners
//! p0 = (x, z), p1 = (x + s, z), p2 = (x + s, z + s), p3 = (x, z + s),
//! emitted as triangles (p2, p1, p0) and (p3, p2, p0). Cells are independent,
//! so the column range can be split across workers and the strips
//! concatenated in order.

use glam::Vec3;
use strata_mesh::{TerrainMesh, TerrainVertex};

use crate::bands::BandTable;
use crate::grid::GridTransform;
use crate::normalize::HeightNormalizer;
use crate::raster::Raster;

/// Builds the terrain mesh from a raster and the shared sampling state.
#[derive(Clone, Copy)]
pub struct MeshBuilder<'a> {
    raster: &'a Raster,
    normalizer: &'a HeightNormalizer,
    grid: &'a GridTransform,
    bands: &'a BandTable,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(
        raster: &'a Raster,
        normalizer: &'a HeightNormalizer,
        grid: &'a GridTransform,
        bands: &'a BandTable,
    ) -> Self {
        Self {
            raster,
            normalizer,
            grid,
            bands,
        }
    }

    /// Triangulate every cell on the calling thread.
    pub fn build(&self) -> TerrainMesh {
        let columns: Vec<usize> = self.grid.cell_columns().collect();
        self.build_columns(&columns)
    }

    /// Triangulate with up to `workers` scoped threads.
    ///
    /// The output is identical to [`MeshBuilder::build`].
    pub fn build_parallel(&self, workers: usize) -> TerrainMesh {
        let columns: Vec<usize> = self.grid.cell_columns().collect();
        let workers = workers.clamp(1, columns.len().max(1));
        if workers == 1 {
            return self.build_columns(&columns);
        }

        let strip_len = columns.len().div_ceil(workers);
        let (cells_x, cells_z) = self.grid.cell_counts();

        std::thread::scope(|scope| {
            let strips: Vec<_> = columns
                .chunks(strip_len)
                .enumerate()
                .map(|(i, strip)| {
                    std::thread::Builder::new()
                        .name(format!("terrain-mesh-{i}"))
                        .spawn_scoped(scope, move || self.build_columns(strip))
                        .map_err(|err| (err, strip))
                })
                .collect();

            let mut mesh = TerrainMesh::with_quad_capacity(cells_x * cells_z);
            for strip in strips {
                let strip_mesh = match strip {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload)),
                    Err((err, strip)) => {
                        tracing::warn!(%err, "Could not spawn mesh worker; building strip inline");
                        self.build_columns(strip)
                    }
                };
                mesh.append(strip_mesh);
            }
            mesh
        })
    }

    fn build_columns(&self, columns: &[usize]) -> TerrainMesh {
        let (_, cells_z) = self.grid.cell_counts();
        let mut mesh = TerrainMesh::with_quad_capacity(columns.len() * cells_z);
        for &x in columns {
            for z in self.grid.cell_rows() {
                mesh.push_quad(self.build_cell(x, z));
            }
        }
        mesh
    }

    /// The four vertices of the cell whose p0 corner is pixel `(x, z)`.
    pub fn build_cell(&self, x: usize, z: usize) -> [TerrainVertex; 4] {
        let s = self.grid.step();
        let pixels = [(x, z), (x + s, z), (x + s, z + s), (x, z + s)];
        let raw = pixels.map(|(col, row)| self.raster.sample(col, row));

        let positions: [Vec3; 4] = std::array::from_fn(|i| {
            let (col, row) = pixels[i];
            self.grid
                .to_world(col, row, self.normalizer.canonical(raw[i]))
        });

        // One band per quad, picked by its highest corner's unit height.
        let band_height = raw
            .iter()
            .map(|&r| self.normalizer.unit(r))
            .fold(f32::MIN, f32::max);
        let uvs = self.bands.uv_rect(band_height);

        let [p0, p1, p2, p3] = positions;
        let n_a = triangle_normal(p2, p1, p0);
        let n_b = triangle_normal(p3, p2, p0);
        let shared = (n_a + n_b).normalize_or(Vec3::Y);
        let normals = [shared, n_a, shared, n_b];

        std::array::from_fn(|i| TerrainVertex::new(positions[i], normals[i], uvs[i]))
    }
}

/// Unit normal of triangle `(a, b, c)` in emitted order.
fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::AtlasTile;
    use crate::normalize::{NormalizationContext, NormalizationParams};
    use glam::Vec2;

    const EPSILON: f32 = 1e-5;

    struct Fixture {
        raster: Raster,
        normalizer: HeightNormalizer,
        grid: GridTransform,
        bands: BandTable,
    }

    impl Fixture {
        fn new(raster: Raster, step: u32, params: NormalizationParams) -> Self {
            let normalizer =
                HeightNormalizer::new(NormalizationContext::from_raster(&raster), params);
            let grid = GridTransform::new(raster.cols(), raster.rows(), step, 1.0, 2.0).unwrap();
            Self {
                raster,
                normalizer,
                grid,
                bands: BandTable::default(),
            }
        }

        fn builder(&self) -> MeshBuilder<'_> {
            MeshBuilder::new(&self.raster, &self.normalizer, &self.grid, &self.bands)
        }
    }

    fn ramp(cols: usize, rows: usize) -> Raster {
        let samples = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| ((c * 7 + r * 13) % 256) as u8))
            .collect();
        Raster::from_raw(cols, rows, samples).unwrap()
    }

    #[test]
    fn test_quad_count_matches_grid() {
        let fx = Fixture::new(ramp(10, 7), 3, NormalizationParams::default());
        let mesh = fx.builder().build();
        // columns 0, 3, 6 and rows 0, 3
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn test_corner_positions_follow_grid() {
        let fx = Fixture::new(ramp(9, 9), 2, NormalizationParams::linear());
        let cell = fx.builder().build_cell(2, 4);
        let expected = [(2, 4), (4, 4), (4, 6), (2, 6)];
        for (vertex, (col, row)) in cell.iter().zip(expected) {
            let y = fx.normalizer.canonical(fx.raster.sample(col, row)) * 2.0;
            let xz = fx.grid.world_xz(col, row);
            assert!(
                (vertex.position() - Vec3::new(xz.x, y, xz.y)).length() < EPSILON,
                "corner ({col}, {row}) at {}",
                vertex.position()
            );
        }
    }

    #[test]
    fn test_every_triangle_is_ccw_from_above() {
        let fx = Fixture::new(ramp(33, 21), 4, NormalizationParams::default());
        let mesh = fx.builder().build();
        assert!(!mesh.is_empty());
        for [a, b, c] in mesh.triangles() {
            let n = (b.position() - a.position()).cross(c.position() - a.position());
            assert!(n.y > 0.0, "Triangle normal {n} points away from +Y");
        }
    }

    #[test]
    fn test_normals_are_unit_and_shared_corners_are_averaged() {
        let fx = Fixture::new(ramp(16, 16), 5, NormalizationParams::linear());
        let builder = fx.builder();
        let cell = builder.build_cell(5, 5);
        for v in &cell {
            assert!((v.normal().length() - 1.0).abs() < EPSILON);
            assert!(v.normal().y > 0.0);
        }
        let n_a = cell[1].normal();
        let n_b = cell[3].normal();
        let avg = (n_a + n_b).normalize();
        assert!((cell[0].normal() - avg).length() < EPSILON);
        assert!((cell[2].normal() - avg).length() < EPSILON);
    }

    #[test]
    fn test_flat_raster_normals_point_up() {
        let fx = Fixture::new(Raster::filled(8, 8, 128).unwrap(), 2, NormalizationParams::default());
        let mesh = fx.builder().build();
        assert_eq!(mesh.quad_count(), 9);
        for v in &mesh.vertices {
            assert_eq!(v.normal(), Vec3::Y);
            assert!((v.position().y + 2.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_quad_shares_one_uv_tile() {
        // Corner heights 0, 0, 0 and 255: the highest corner picks snow.
        let mut samples = vec![0u8; 16];
        samples[2 * 4 + 2] = 255;
        let fx = Fixture::new(
            Raster::from_raw(4, 4, samples).unwrap(),
            2,
            NormalizationParams::linear(),
        );
        let cell = fx.builder().build_cell(0, 0);
        let tile = 1.0 / 16.0;
        let origin = Vec2::new(0.0, 4.0 * tile);
        assert!((cell[0].uv() - origin).length() < EPSILON);
        assert!((cell[1].uv() - (origin + Vec2::new(tile, 0.0))).length() < EPSILON);
        assert!((cell[2].uv() - (origin + Vec2::new(tile, tile))).length() < EPSILON);
        assert!((cell[3].uv() - (origin + Vec2::new(0.0, tile))).length() < EPSILON);
    }

    #[test]
    fn test_band_ignores_contrast_stage() {
        // unit heights 0 and 0.6: contrast would lift 0.6 into dark rock
        let samples = vec![0, 153, 0, 153, 0, 0, 0, 0, 255];
        let fx = Fixture::new(
            Raster::from_raw(3, 3, samples).unwrap(),
            1,
            NormalizationParams::default(),
        );
        let cell = fx.builder().build_cell(0, 0);
        let rock = fx.bands.atlas().tile_origin(AtlasTile::new(0, 1));
        assert!((cell[0].uv() - rock).length() < EPSILON, "got {}", cell[0].uv());
    }

    #[test]
    fn test_parallel_build_matches_serial() {
        let fx = Fixture::new(ramp(67, 45), 3, NormalizationParams::default());
        let builder = fx.builder();
        let serial = builder.build();
        for workers in [1, 2, 3, 7, 64] {
            assert_eq!(builder.build_parallel(workers), serial, "workers={workers}");
        }
    }

    #[test]
    fn test_raster_smaller_than_step_gives_empty_mesh() {
        let fx = Fixture::new(ramp(3, 3), 4, NormalizationParams::default());
        assert!(fx.builder().build().is_empty());
        assert!(fx.builder().build_parallel(4).is_empty());
    }
}

//! End-to-end checks: heightmap file in, mesh and height queries out.

use glam::{Vec2, Vec3};
use strata_terrain::{
    AtlasTile, BandTable, NormalizationParams, Raster, Terrain, TerrainError, TerrainParams,
};

const EPSILON: f32 = 1e-5;

fn noise_raster(cols: usize, rows: usize, seed: usize) -> Raster {
    let samples = (0..cols * rows)
        .map(|i| (((i * 2654435761 + seed * 97) >> 7) & 0xff) as u8)
        .collect();
    Raster::from_raw(cols, rows, samples).unwrap()
}

#[test]
fn height_queries_match_every_vertex() {
    let cases = [
        (64, 48, 1, 0.05, 0.5),
        (101, 77, 7, 0.1, 3.0),
        (31, 31, 30, 1.0, 1.0),
        (257, 129, 30, 0.05, 0.5),
    ];
    for (seed, (cols, rows, step, scale_xz, height_scale)) in cases.into_iter().enumerate() {
        let params = TerrainParams {
            step_size: step,
            scale_xz,
            height_scale,
            ..Default::default()
        };
        let terrain = Terrain::from_raster(noise_raster(cols, rows, seed), params).unwrap();
        for v in &terrain.mesh().vertices {
            let p = v.position();
            let h = terrain.height_at(p.x, p.z);
            assert!(
                (h - p.y).abs() < EPSILON,
                "{cols}x{rows} step {step}: vertex {p} but query says {h}"
            );
            assert!(terrain.contains(p.x, p.z));
        }
    }
}

#[test]
fn five_band_raster_picks_each_tile() {
    // One row of cells, each quad's highest corner is the column to its right.
    // Unit heights: 0.1, 0.35, 0.6, 0.85, 0.95, then 1.0.
    let values = [0u8, 26, 89, 153, 217, 242, 255];
    let samples = values.iter().chain(values.iter()).copied().collect();
    let raster = Raster::from_raw(7, 2, samples).unwrap();
    let expected = ["grass", "soil", "rock", "dark_rock", "snow", "snow"];
    let bands = BandTable::default();

    for normalization in [NormalizationParams::default(), NormalizationParams::linear()] {
        let params = TerrainParams {
            step_size: 1,
            height_scale: 1.0,
            scale_xz: 1.0,
            normalization,
            worker_threads: 2,
        };
        let terrain = Terrain::from_raster(raster.clone(), params).unwrap();
        assert_eq!(terrain.mesh().quad_count(), expected.len());

        for (quad, name) in expected.iter().enumerate() {
            let band = bands.bands().iter().find(|b| b.name == *name).unwrap();
            let origin = bands.atlas().tile_origin(band.tile);
            let uv = terrain.mesh().vertices[quad * 4].uv();
            assert!(
                (uv - origin).length() < EPSILON,
                "{normalization:?}: quad {quad} should use {name}, got uv {uv}"
            );
        }
    }
}

#[test]
fn custom_band_table_is_used() {
    let bands = BandTable::from_ron(
        r#"(
            atlas: (tiles_per_row: 2, tiles_per_column: 2),
            bands: [
                (name: "high", threshold: 0.5, tile: (column: 1, row: 1)),
                (name: "low", threshold: -1.0, tile: (column: 0, row: 0)),
            ],
        )"#,
    )
    .unwrap();
    let raster = Raster::from_raw(3, 2, vec![0, 0, 255, 0, 0, 255]).unwrap();
    let params = TerrainParams {
        step_size: 1,
        normalization: NormalizationParams::linear(),
        ..Default::default()
    };
    let terrain = Terrain::with_bands(raster, params, bands).unwrap();
    assert_eq!(terrain.bands().select(0.9).tile, AtlasTile::new(1, 1));

    let uvs: Vec<Vec2> = terrain.mesh().vertices.iter().map(|v| v.uv()).collect();
    assert!((uvs[0] - Vec2::ZERO).length() < EPSILON);
    assert!((uvs[4] - Vec2::new(0.5, 0.5)).length() < EPSILON);
    assert!((uvs[6] - Vec2::ONE).length() < EPSILON);
}

#[test]
fn loads_grayscale_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heights.png");
    image::GrayImage::from_fn(32, 16, |x, y| image::Luma([(x * 7 + y) as u8]))
        .save(&path)
        .unwrap();

    let params = TerrainParams {
        step_size: 4,
        ..Default::default()
    };
    let terrain = Terrain::load(&path, params).unwrap();
    assert_eq!(terrain.raster().cols(), 32);
    assert_eq!(terrain.raster().rows(), 16);
    assert_eq!(terrain.raster().sample(3, 2), 23);
    // columns 0..28 step 4 and rows 0..12 step 4
    assert_eq!(terrain.mesh().quad_count(), 7 * 3);

    let bounds = terrain.bounds().unwrap();
    assert!(bounds.min.y >= -0.5 - EPSILON && bounds.max.y <= 0.5 + EPSILON);
}

#[test]
fn loads_rgb_png_using_first_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heights_rgb.png");
    image::RgbImage::from_fn(8, 8, |x, _| image::Rgb([(x * 30) as u8, 255, 7]))
        .save(&path)
        .unwrap();

    let terrain = Terrain::load(
        &path,
        TerrainParams {
            step_size: 2,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(terrain.raster().sample(4, 0), 120);
    assert_eq!(terrain.normalizer().context().max(), 210);
}

#[test]
fn missing_heightmap_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.png");
    let err = Terrain::load(&path, TerrainParams::default()).unwrap_err();
    match err {
        TerrainError::Load { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn undecodable_heightmap_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.png");
    std::fs::write(&path, b"definitely not a png").unwrap();
    assert!(matches!(
        Terrain::load(&path, TerrainParams::default()),
        Err(TerrainError::Load { .. })
    ));
}

#[test]
fn placed_objects_sit_on_the_mesh() {
    let terrain = Terrain::from_raster(
        noise_raster(90, 60, 3),
        TerrainParams {
            step_size: 3,
            height_scale: 2.0,
            ..Default::default()
        },
    )
    .unwrap();
    for v in terrain.mesh().vertices.iter().step_by(13) {
        let p = v.position();
        let placed = terrain.place_on_surface(Vec3::new(p.x, 1000.0, p.z), 0.25);
        assert!((placed.y - (p.y + 0.25)).abs() < EPSILON);
    }
}

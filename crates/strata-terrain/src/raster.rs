//! Single-channel 8-bit elevation raster.

use std::path::Path;

use image::{ColorType, DynamicImage};

use crate::error::TerrainError;

/// An immutable `cols × rows` grid of raw 8-bit elevation samples, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    cols: usize,
    rows: usize,
    samples: Vec<u8>,
}

impl Raster {
    /// Wrap raw row-major samples.
    ///
    /// # Errors
    ///
    /// [`TerrainError::EmptyRaster`] for a zero dimension and
    /// [`TerrainError::DimensionMismatch`] if `samples.len() != cols * rows`.
    pub fn from_raw(cols: usize, rows: usize, samples: Vec<u8>) -> Result<Self, TerrainError> {
        if cols == 0 || rows == 0 {
            return Err(TerrainError::EmptyRaster { cols, rows });
        }
        if samples.len() != cols * rows {
            return Err(TerrainError::DimensionMismatch {
                cols,
                rows,
                len: samples.len(),
            });
        }
        Ok(Self {
            cols,
            rows,
            samples,
        })
    }

    /// A raster with every sample set to `value`.
    pub fn filled(cols: usize, rows: usize, value: u8) -> Result<Self, TerrainError> {
        Self::from_raw(cols, rows, vec![value; cols * rows])
    }

    /// Decode a heightmap image from disk.
    ///
    /// See [`Raster::from_image`] for how multi-channel images are handled.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TerrainError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let raster = Self::from_image(image)?;
        tracing::info!(
            path = %path.display(),
            cols = raster.cols,
            rows = raster.rows,
            "Loaded heightmap"
        );
        Ok(raster)
    }

    /// Convert a decoded image into a raster.
    ///
    /// Anything other than 8-bit luma is accepted with a warning: the first
    /// channel of every pixel is used as the elevation sample. Images with
    /// wider channels are reduced to 8 bits first.
    pub fn from_image(image: DynamicImage) -> Result<Self, TerrainError> {
        let cols = image.width() as usize;
        let rows = image.height() as usize;
        if cols == 0 || rows == 0 {
            return Err(TerrainError::EmptyRaster { cols, rows });
        }

        let color = image.color();
        if color == ColorType::L8 {
            return Self::from_raw(cols, rows, image.into_bytes());
        }

        let channels = color.channel_count();
        tracing::warn!(
            ?color,
            channels,
            "Heightmap is not single-channel 8-bit; using the first channel"
        );

        let (stride, bytes) = if color.bytes_per_pixel() == channels {
            (channels as usize, image.into_bytes())
        } else {
            (4, image.to_rgba8().into_raw())
        };
        let samples = bytes.chunks_exact(stride).map(|px| px[0]).collect();
        Self::from_raw(cols, rows, samples)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row-major sample slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }

    /// Raw sample at `(col, row)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the raster. Callers clamp first.
    pub fn sample(&self, col: usize, row: usize) -> u8 {
        assert!(
            col < self.cols && row < self.rows,
            "sample ({col}, {row}) outside {}x{} raster",
            self.cols,
            self.rows
        );
        self.samples[row * self.cols + col]
    }

    /// Raw sample at the nearest valid coordinate.
    pub fn clamped_sample(&self, col: i64, row: i64) -> u8 {
        let col = col.clamp(0, self.cols as i64 - 1) as usize;
        let row = row.clamp(0, self.rows as i64 - 1) as usize;
        self.samples[row * self.cols + col]
    }

    /// Smallest and largest sample. Full scan; cache the result.
    pub fn scan_min_max(&self) -> (u8, u8) {
        self.samples
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
    }
}

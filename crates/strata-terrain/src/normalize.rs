//! Raw sample → canonical elevation pipeline.
//!
//! 1. Min/max scaling to `[0, 1]` using the raster's [`NormalizationContext`].
//! 2. Optional contrast boost around mid-grey followed by a gamma curve.
//! 3. Optional quantization into `L` terrace levels, mapped to `[-1, 1]`;
//!    without quantization the value is recentred as `(h - 0.5) * 2`.
//!
//! Every stage is a pure function of one value. The mesh builder and the
//! height query both go through the same [`HeightNormalizer`].

use crate::error::TerrainError;
use crate::raster::Raster;

/// Ranges at or below this width are treated as flat.
pub const RANGE_EPSILON: f32 = 1e-5;

/// Min/max of a raster, scanned once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizationContext {
    min: u8,
    max: u8,
    denom: f32,
}

impl NormalizationContext {
    /// Scan `raster` for its sample range.
    pub fn from_raster(raster: &Raster) -> Self {
        let (min, max) = raster.scan_min_max();
        Self::from_min_max(min, max)
    }

    /// Build from a known range. A flat range gets a denominator of exactly 1.
    pub fn from_min_max(min: u8, max: u8) -> Self {
        let range = f32::from(max) - f32::from(min);
        let denom = if range > RANGE_EPSILON { range } else { 1.0 };
        Self { min, max, denom }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Always strictly positive.
    pub fn denom(&self) -> f32 {
        self.denom
    }

    /// Stage 1: scale a raw sample into `[0, 1]`.
    ///
    /// Samples outside the scanned range are clamped.
    pub fn unit(&self, raw: u8) -> f32 {
        ((f32::from(raw) - f32::from(self.min)) / self.denom).clamp(0.0, 1.0)
    }
}

/// Contrast boost settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContrastParams {
    /// Multiplier applied to the distance from mid-grey.
    pub factor: f32,
    /// Exponent applied after the contrast stretch; below 1 sharpens transitions.
    pub gamma: f32,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            factor: 2.5,
            gamma: 0.7,
        }
    }
}

/// Which optional stages run, and with what constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizationParams {
    /// `None` skips the contrast stage.
    pub contrast: Option<ContrastParams>,
    /// Terrace level count; `None` skips quantization.
    pub levels: Option<u32>,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self {
            contrast: Some(ContrastParams::default()),
            levels: Some(16),
        }
    }
}

impl NormalizationParams {
    /// Plain min/max normalization, no contrast and no terraces.
    pub fn linear() -> Self {
        Self {
            contrast: None,
            levels: None,
        }
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if let Some(contrast) = self.contrast {
            if !contrast.factor.is_finite() || contrast.factor < 0.0 {
                return Err(TerrainError::InvalidParams(format!(
                    "contrast factor must be finite and non-negative, got {}",
                    contrast.factor
                )));
            }
            if !contrast.gamma.is_finite() || contrast.gamma <= 0.0 {
                return Err(TerrainError::InvalidParams(format!(
                    "gamma must be finite and positive, got {}",
                    contrast.gamma
                )));
            }
        }
        if let Some(levels) = self.levels
            && levels < 2
        {
            return Err(TerrainError::InvalidParams(format!(
                "quantization needs at least 2 levels, got {levels}"
            )));
        }
        Ok(())
    }
}

/// Stage 2: stretch `h` around 0.5, clamp to `[0, 1]`, then apply gamma.
pub fn enhance_contrast(h: f32, params: &ContrastParams) -> f32 {
    let stretched = ((h - 0.5) * params.factor + 0.5).clamp(0.0, 1.0);
    stretched.powf(params.gamma)
}

/// Stage 3a: terrace index of `h` in `[0, levels - 1]`.
pub fn quantize_level(h: f32, levels: u32) -> u32 {
    let level = (h * levels as f32).floor();
    (level.max(0.0) as u32).min(levels.saturating_sub(1))
}

/// Stage 3b: map a terrace index back to `[-1, 1]`.
///
/// `levels` must be at least 2; [`NormalizationParams::validate`] enforces this
/// for the pipeline.
pub fn level_to_canonical(level: u32, levels: u32) -> f32 {
    debug_assert!(levels >= 2, "level_to_canonical needs at least 2 levels, got {levels}");
    level as f32 / (levels - 1) as f32 * 2.0 - 1.0
}

/// The complete pipeline bound to one raster's range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightNormalizer {
    context: NormalizationContext,
    params: NormalizationParams,
}

impl HeightNormalizer {
    pub fn new(context: NormalizationContext, params: NormalizationParams) -> Self {
        Self { context, params }
    }

    pub fn context(&self) -> &NormalizationContext {
        &self.context
    }

    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Stage 1 only: the value used for texture band selection, in `[0, 1]`.
    pub fn unit(&self, raw: u8) -> f32 {
        self.context.unit(raw)
    }

    /// Stages 1 and 2, before terracing.
    pub fn shaped(&self, raw: u8) -> f32 {
        let h = self.context.unit(raw);
        match &self.params.contrast {
            Some(contrast) => enhance_contrast(h, contrast),
            None => h,
        }
    }

    /// Full pipeline: canonical elevation in `[-1, 1]`.
    pub fn canonical(&self, raw: u8) -> f32 {
        let h = self.shaped(raw);
        match self.params.levels {
            Some(levels) => level_to_canonical(quantize_level(h, levels), levels),
            None => (h - 0.5) * 2.0,
        }
    }
}

use crate::error::LabelError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Two-tone, single-channel bitmap ready for OCR
///
/// Same pixel dimensions as the decoded upload; every pixel is 0 (ink) or
/// 255 (background).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBitmap(GrayImage);

impl NormalizedBitmap {
    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_image(self) -> GrayImage {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

/// Tunables for the smoothing and binarization steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeParams {
    pub bilateral_diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
    pub threshold_block_size: u32,
    pub threshold_offset: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            bilateral_diameter: steps::bilateral::DIAMETER,
            sigma_color: steps::bilateral::SIGMA_COLOR,
            sigma_space: steps::bilateral::SIGMA_SPACE,
            threshold_block_size: steps::threshold::BLOCK_SIZE,
            threshold_offset: steps::threshold::OFFSET,
        }
    }
}

/// Timing information for a single normalization step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of normalization including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationResult {
    /// Normalized bitmap (not serialized)
    #[serde(skip)]
    pub bitmap: NormalizedBitmap,
    /// Total normalization time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Decode, grayscale, equalize, smooth, binarize, despeckle
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    params: NormalizeParams,
}

impl Normalizer {
    pub fn new(params: NormalizeParams) -> Self {
        Self { params }
    }

    /// Normalize raw upload bytes into an OCR-friendly bitmap
    pub fn process(&self, bytes: &[u8]) -> Result<NormalizationResult, LabelError> {
        let start = Instant::now();
        let mut timings = Vec::new();
        let params = self.params;

        let decoded = self.run_step("decode", bytes, &mut timings, decode)?;
        let gray = self.run_step("grayscale", decoded, &mut timings, |img| {
            Ok(steps::grayscale::apply(img))
        })?;
        let equalized = self.run_step("equalize", gray, &mut timings, |img| {
            Ok(steps::equalize::apply(img))
        })?;
        let smoothed = self.run_step("bilateral", equalized, &mut timings, |img| {
            Ok(steps::bilateral::bilateral_filter(
                &img,
                params.bilateral_diameter,
                params.sigma_color,
                params.sigma_space,
            ))
        })?;
        let binary = self.run_step("threshold", smoothed, &mut timings, |img| {
            Ok(steps::threshold::adaptive_gaussian_threshold(
                &img,
                params.threshold_block_size,
                params.threshold_offset,
            ))
        })?;
        let opened = self.run_step("open", binary, &mut timings, |img| {
            Ok(steps::morphology::apply(img))
        })?;

        Ok(NormalizationResult {
            bitmap: NormalizedBitmap(opened),
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        })
    }

    fn run_step<I, O, F>(
        &self,
        name: &str,
        input: I,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<O, LabelError>
    where
        F: FnOnce(I) -> Result<O, LabelError>,
    {
        let step_start = Instant::now();
        let result = step_fn(input)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!(step = name, time_ms, "normalization step finished");
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}

/// Normalize with the default label parameters
pub fn normalize(bytes: &[u8]) -> Result<NormalizedBitmap, LabelError> {
    Normalizer::default().process(bytes).map(|result| result.bitmap)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, LabelError> {
    if bytes.is_empty() {
        return Err(LabelError::Decode("empty image buffer".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| LabelError::Decode(e.to_string()))
}

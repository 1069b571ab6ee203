//! Image normalization for label OCR
//!
//! Turns an uploaded photo into a two-tone bitmap: grayscale, equalized,
//! edge-preserving smoothed, locally binarized and despeckled.

pub mod pipeline;
pub mod steps;

pub use pipeline::{normalize, NormalizationResult, NormalizeParams, NormalizedBitmap, Normalizer, StepTiming};

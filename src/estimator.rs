//! Label estimator: raw upload bytes in, annual kWh and recognized text out

use crate::error::LabelError;
use crate::extraction::{extract_reading, Extraction};
use crate::preprocessing::{NormalizationResult, Normalizer};
use crate::recognition::{Recognition, Recognizer};
use serde::Serialize;
use std::time::Instant;

/// What callers persist and display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub annual_kwh: Option<f64>,
    pub raw_text: String,
}

impl Estimate {
    pub fn unknown() -> Self {
        Self {
            annual_kwh: None,
            raw_text: String::new(),
        }
    }
}

/// Every intermediate result of one estimation, for auditing
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub normalization: NormalizationResult,
    pub recognition: Recognition,
    pub extraction: Extraction,
    pub total_time_ms: u64,
}

impl Analysis {
    pub fn estimate(&self) -> Estimate {
        Estimate {
            annual_kwh: self.extraction.annual_kwh,
            raw_text: self.recognition.text.clone(),
        }
    }
}

/// Normalizer, recognizer and extractor composed into one call
///
/// Holds no per-call state; one value can serve concurrent callers.
pub struct LabelEstimator {
    normalizer: Normalizer,
    recognizer: Recognizer,
}

impl LabelEstimator {
    pub fn new(recognizer: Recognizer) -> Self {
        Self {
            normalizer: Normalizer::default(),
            recognizer,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    /// Annual kWh and recognized text; an undecodable upload gives `(None, "")`
    pub fn estimate(&self, bytes: &[u8]) -> Estimate {
        match self.analyze(bytes) {
            Ok(analysis) => analysis.estimate(),
            Err(e) => {
                tracing::warn!(error = %e, "label image could not be decoded");
                Estimate::unknown()
            }
        }
    }

    /// Run all three stages, failing only when the bytes are not an image
    pub fn analyze(&self, bytes: &[u8]) -> Result<Analysis, LabelError> {
        let start = Instant::now();

        let normalization = self.normalizer.process(bytes)?;
        let recognition = self.recognizer.run(&normalization.bitmap);
        let extraction = extract_reading(&recognition.text);

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            annual_kwh = ?extraction.annual_kwh,
            text_len = recognition.text.len(),
            total_time_ms,
            "label estimate finished"
        );

        Ok(Analysis {
            normalization,
            recognition,
            extraction,
            total_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LayoutMode;
    use crate::engines::ScriptedEngine;
    use crate::recognition::RecognizerConfig;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn png() -> Vec<u8> {
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x % 6 < 2 {
                Rgb([10, 10, 10])
            } else {
                Rgb([250, 250, 240])
            }
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn estimator(engine: ScriptedEngine) -> LabelEstimator {
        LabelEstimator::new(Recognizer::new(Arc::new(engine), RecognizerConfig::default()))
    }

    #[test]
    fn test_estimate_end_to_end() {
        let engine = ScriptedEngine::new()
            .with_text(LayoutMode::Block, "Energy\n12 kWh/month")
            .with_text(LayoutMode::Sparse, "12 kWh");
        let estimate = estimator(engine).estimate(&png());

        assert_eq!(estimate.annual_kwh, Some(144.0));
        assert_eq!(estimate.raw_text, "Energy\n12 kWh/month");
    }

    #[test]
    fn test_undecodable_bytes_give_unknown_and_empty_text() {
        let engine = Arc::new(ScriptedEngine::uniform("150 kwh"));
        let estimator =
            LabelEstimator::new(Recognizer::new(engine.clone(), RecognizerConfig::default()));

        assert_eq!(estimator.estimate(b"not an image"), Estimate::unknown());
        assert_eq!(estimator.estimate(&[]), Estimate::unknown());
        // Recognition never ran
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_analyze_surfaces_decode_error() {
        let err = estimator(ScriptedEngine::new()).analyze(b"\x89PNG broken").unwrap_err();
        assert!(matches!(err, LabelError::Decode(_)));
    }

    #[test]
    fn test_text_without_reading_is_kept() {
        let estimate = estimator(ScriptedEngine::uniform("ENERGY LABEL")).estimate(&png());
        assert_eq!(estimate.annual_kwh, None);
        assert_eq!(estimate.raw_text, "ENERGY LABEL");
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let estimator = estimator(ScriptedEngine::uniform("40 W"));
        let bytes = png();
        let first = estimator.analyze(&bytes).unwrap();
        let second = estimator.analyze(&bytes).unwrap();

        assert_eq!(first.estimate(), second.estimate());
        assert_eq!(first.normalization.bitmap, second.normalization.bitmap);
        assert_eq!(first.estimate().annual_kwh, Some(43.8));
    }
}

//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait. The Tesseract
//! engine is conditionally compiled behind the `engine-tesseract` feature; the
//! scripted engine is always available and stands in for a real engine when
//! exercising the pipeline without OCR models installed.

pub mod scripted;

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

pub use scripted::ScriptedEngine;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::LabelError;
use serde::Serialize;
use std::sync::Arc;

/// Information about the active engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
}

impl EngineInfo {
    pub fn of(engine: &dyn OcrEngine) -> Self {
        Self {
            name: engine.name(),
            description: engine.description(),
        }
    }
}

/// Build the OCR engine selected by the enabled cargo features
#[cfg(feature = "engine-tesseract")]
pub fn from_config(config: &Config) -> Result<Arc<dyn OcrEngine>, LabelError> {
    tracing::info!("Initializing tesseract engine...");
    let engine = tesseract::TesseractEngine::new(config)?;
    Ok(Arc::new(engine))
}

/// Build the OCR engine selected by the enabled cargo features
#[cfg(not(feature = "engine-tesseract"))]
pub fn from_config(_config: &Config) -> Result<Arc<dyn OcrEngine>, LabelError> {
    Err(LabelError::Initialization(
        "No OCR engines available. Build with --features engine-tesseract".to_string(),
    ))
}

//! Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Layout assumptions map onto Tesseract page
//! segmentation modes. Uses tesseract-static crate for static linking (no
//! system dependencies). Downloads tessdata (training data) for every
//! configured language on first use unless a tessdata directory is given.

use crate::config::Config;
use crate::engine::{LanguageSet, LayoutMode, OcrEngine};
use crate::error::LabelError;
use image::GrayImage;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    /// Path to tessdata directory
    tessdata_path: String,
}

impl TesseractEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, LabelError> {
        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&config.languages)?,
        };

        // Validate that every language loads by doing a test initialization
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(&config.languages.joined()))
            .map_err(|e| {
                LabelError::Initialization(format!("Failed to initialize Tesseract: {}", e))
            })?;
        drop(test_tess);

        tracing::info!(
            "Tesseract engine initialized (tessdata: {}, languages: {})",
            tessdata_path,
            config.languages.joined()
        );

        Ok(Self { tessdata_path })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - multilingual, one pass per page segmentation mode"
    }

    fn recognize(
        &self,
        bitmap: &GrayImage,
        mode: LayoutMode,
        languages: &LanguageSet,
    ) -> Result<String, LabelError> {
        let (width, height) = bitmap.dimensions();

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let mut bmp_data = Vec::new();
        bitmap
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| LabelError::Recognition(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Running {} pass: {}x{}, BMP size: {} bytes",
            mode,
            width,
            height,
            bmp_data.len()
        );

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&languages.joined()))
            .map_err(|e| LabelError::Recognition(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess
            .set_variable("tessedit_pageseg_mode", &mode.page_seg_mode().to_string())
            .map_err(|e| {
                LabelError::Recognition(format!("Failed to set page segmentation mode: {}", e))
            })?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            LabelError::Recognition(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| LabelError::Recognition(format!("Failed to recognize text: {}", e)))?;

        tess.get_text()
            .map_err(|e| LabelError::Recognition(format!("Failed to get text: {}", e)))
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure tessdata for every language is cached, downloading what is missing
fn ensure_tessdata_available(languages: &LanguageSet) -> Result<String, LabelError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wattcompare")
        .join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        LabelError::Initialization(format!("Failed to create tessdata directory: {}", e))
    })?;

    for language in languages.codes() {
        let traineddata_path = traineddata_path(&cache_dir, language);
        if traineddata_path.exists() {
            tracing::debug!("Using cached tessdata for '{}'", language);
            continue;
        }

        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            language
        );
        download_file(&tessdata_url(language), &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LabelError::Initialization("Invalid tessdata path".to_string()))
}

fn traineddata_path(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{}.traineddata", language))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), LabelError> {
    let response = ureq::get(url).call().map_err(|e| {
        LabelError::Initialization(format!("Failed to download tessdata: {}", e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        LabelError::Initialization(format!("Failed to read tessdata response: {}", e))
    })?;

    // Write next to the target first so an interrupted download is not cached
    let partial = path.with_extension("traineddata.part");
    let mut file = File::create(&partial).map_err(|e| {
        LabelError::Initialization(format!("Failed to create tessdata file: {}", e))
    })?;
    file.write_all(&buffer).map_err(|e| {
        LabelError::Initialization(format!("Failed to write tessdata file: {}", e))
    })?;
    std::fs::rename(&partial, path).map_err(|e| {
        LabelError::Initialization(format!("Failed to move tessdata file: {}", e))
    })?;

    Ok(())
}

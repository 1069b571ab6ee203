use crate::error::LabelError;
use image::GrayImage;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Tesseract language codes requested on every pass unless configured otherwise
pub const DEFAULT_LANGUAGES: &str = "eng+hin+tam+tel+spa+fra+deu+ita+por+rus+ara+jpn+kor";

/// Hint given to the OCR engine about how text is arranged on the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// A single uniform block of text
    Block,
    /// Sparse text scattered across the image, no particular order
    Sparse,
    /// Fully automatic page segmentation
    Auto,
}

impl LayoutMode {
    /// Pass order used by the recognizer; ties are broken by this order
    pub const DEFAULT_ORDER: [LayoutMode; 3] =
        [LayoutMode::Block, LayoutMode::Sparse, LayoutMode::Auto];

    /// Tesseract page segmentation mode number for this layout
    pub fn page_seg_mode(&self) -> u8 {
        match self {
            Self::Block => 6,
            Self::Sparse => 11,
            Self::Auto => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Sparse => "sparse",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of OCR language codes, e.g. `eng+deu+fra`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    codes: Vec<String>,
}

impl LanguageSet {
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Language argument in the `+`-joined form Tesseract expects
    pub fn joined(&self) -> String {
        self.codes.join("+")
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        DEFAULT_LANGUAGES
            .parse()
            .unwrap_or_else(|_| Self { codes: vec!["eng".to_string()] })
    }
}

impl FromStr for LanguageSet {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut codes: Vec<String> = Vec::new();
        for code in s.split(['+', ',']).map(str::trim).filter(|c| !c.is_empty()) {
            if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(LabelError::InvalidRequest(format!(
                    "Invalid language code: '{}'",
                    code
                )));
            }
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }

        if codes.is_empty() {
            return Err(LabelError::InvalidRequest(
                "At least one OCR language is required".to_string(),
            ));
        }

        Ok(Self { codes })
    }
}

/// OCR capability consumed by the recognizer
///
/// Implementations must be usable from several threads at once; a single
/// engine value is shared by every layout pass and every request.
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract", "scripted")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in a normalized bitmap under one layout assumption
    fn recognize(
        &self,
        bitmap: &GrayImage,
        mode: LayoutMode,
        languages: &LanguageSet,
    ) -> Result<String, LabelError>;
}

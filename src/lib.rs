//! Appliance energy-label reader
//!
//! Estimates an appliance's annual energy use from a photo of its energy
//! label and compares running costs between appliances. The core entry point
//! is [`LabelEstimator::estimate`].

pub mod comparison;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod estimator;
pub mod extraction;
pub mod preprocessing;
pub mod recognition;
pub mod server;

pub use comparison::{ApplianceProfile, Comparator, Comparison};
pub use engine::{LanguageSet, LayoutMode, OcrEngine};
pub use error::LabelError;
pub use estimator::{Estimate, LabelEstimator};
pub use extraction::{extract, ParsedReading};
pub use recognition::{Recognizer, RecognizerConfig};

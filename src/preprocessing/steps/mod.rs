//! Individual normalization steps

pub mod bilateral;
pub mod equalize;
pub mod grayscale;
pub mod morphology;
pub mod threshold;

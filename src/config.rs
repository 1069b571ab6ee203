use crate::engine::{LanguageSet, DEFAULT_LANGUAGES};
use crate::error::LabelError;
use clap::Parser;
use std::time::Duration;

/// kg of CO2 emitted per kWh of grid electricity
pub const DEFAULT_CO2_FACTOR: f64 = 0.82;

#[derive(Parser, Debug)]
#[command(name = "wattcompare-server")]
#[command(about = "Reads appliance energy labels and compares running costs")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "WATT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "WATT_PORT", default_value = "5000")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 20MB)
    #[arg(long, env = "WATT_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    /// OCR languages requested on every pass, joined with '+'
    #[arg(long, env = "WATT_OCR_LANGUAGES", default_value = DEFAULT_LANGUAGES)]
    pub languages: String,

    /// Path to tessdata directory (models are downloaded to the cache dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Deadline for all recognition passes of one image, in seconds (0 disables)
    #[arg(long, env = "WATT_OCR_TIMEOUT_SECS", default_value = "60")]
    pub ocr_timeout_secs: u64,

    /// Run the layout passes concurrently
    #[arg(long, env = "WATT_PARALLEL_PASSES")]
    pub parallel_passes: bool,

    /// Upper bound on recognition worker threads alive at once, stalled ones included
    #[arg(long, env = "WATT_MAX_OCR_THREADS", default_value = "16")]
    pub max_ocr_threads: usize,

    /// kg CO2 per kWh used by comparisons
    #[arg(long, env = "WATT_CO2_FACTOR", default_value = "0.82")]
    pub co2_factor: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub languages: LanguageSet,
    pub tessdata_path: Option<String>,
    pub ocr_timeout: Option<Duration>,
    pub parallel_passes: bool,
    pub max_ocr_threads: usize,
    pub co2_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_file_size: 20 * 1024 * 1024,
            languages: LanguageSet::default(),
            tessdata_path: None,
            ocr_timeout: Some(Duration::from_secs(60)),
            parallel_passes: false,
            max_ocr_threads: 16,
            co2_factor: DEFAULT_CO2_FACTOR,
        }
    }
}

impl TryFrom<Args> for Config {
    type Error = LabelError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if !args.co2_factor.is_finite() || args.co2_factor < 0.0 {
            return Err(LabelError::InvalidRequest(format!(
                "CO2 factor must be a non-negative number, got {}",
                args.co2_factor
            )));
        }

        if args.max_ocr_threads == 0 {
            return Err(LabelError::InvalidRequest(
                "At least one OCR worker thread is required".to_string(),
            ));
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            languages: args.languages.parse()?,
            tessdata_path: args.tessdata_path,
            ocr_timeout: (args.ocr_timeout_secs > 0)
                .then(|| Duration::from_secs(args.ocr_timeout_secs)),
            parallel_passes: args.parallel_passes,
            max_ocr_threads: args.max_ocr_threads,
            co2_factor: args.co2_factor,
        })
    }
}

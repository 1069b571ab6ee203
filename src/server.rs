use crate::comparison::{ApplianceProfile, Comparator, Comparison};
use crate::config::Config;
use crate::engine::LayoutMode;
use crate::engines::{self, EngineInfo};
use crate::error::LabelError;
use crate::estimator::LabelEstimator;
use crate::extraction::ParsedReading;
use crate::recognition::{Recognizer, RecognizerConfig};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub estimator: Arc<LabelEstimator>,
    pub comparator: Comparator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(estimator: LabelEstimator, config: Config) -> Self {
        Self {
            estimator: Arc::new(estimator),
            comparator: Comparator::new(config.co2_factor),
            config: Arc::new(config),
        }
    }
}

/// Label OCR response
#[derive(Serialize)]
pub struct OcrResponse {
    pub estimated_kwh_per_year: Option<f64>,
    pub raw_text: String,
    pub reading: Option<ParsedReading>,
    pub layout: Option<LayoutMode>,
    pub processing_time_ms: u64,
}

#[derive(Deserialize)]
pub struct CompareRequest {
    pub a: ApplianceProfile,
    pub b: ApplianceProfile,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub time: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: EngineInfo,
    pub languages: Vec<String>,
    pub layout_modes: Vec<LayoutMode>,
    pub max_file_size_bytes: usize,
    pub ocr_timeout_secs: Option<u64>,
    pub max_ocr_threads: usize,
    pub ocr_threads_in_flight: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = engines::from_config(&config)?;
    let recognizer = Recognizer::new(engine, RecognizerConfig::from(&config));
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(AppState::new(LabelEstimator::new(recognizer), config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/api/ocr", post(handle_ocr))
        .route("/api/compare", post(handle_compare))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle label uploads
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, LabelError> {
    let start = Instant::now();

    let max_file_size = state.config.max_file_size;
    let mut file_data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if field.name() == Some("image") {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_file_size))?,
            );
        }
    }

    let data = file_data.ok_or(LabelError::MissingFile)?;

    // Normalization and OCR are CPU-bound
    let estimator = Arc::clone(&state.estimator);
    let analysis = tokio::task::spawn_blocking(move || estimator.analyze(&data))
        .await
        .map_err(|e| LabelError::Internal(format!("Recognition task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let estimate = analysis.estimate();

    tracing::info!(
        "Label processed in {}ms, estimate: {:?} kWh/year, text length: {}",
        processing_time_ms,
        estimate.annual_kwh,
        estimate.raw_text.len()
    );

    Ok(Json(OcrResponse {
        estimated_kwh_per_year: estimate.annual_kwh,
        raw_text: estimate.raw_text,
        reading: analysis.extraction.reading.map(|m| m.reading),
        layout: analysis.recognition.selected,
        processing_time_ms,
    }))
}

/// Body-limit rejections become 413, anything else is a malformed upload
fn multipart_error(err: MultipartError, max_file_size: usize) -> LabelError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LabelError::ImageTooLarge { max: max_file_size }
    } else {
        LabelError::InvalidRequest(format!("Failed to parse multipart: {}", err))
    }
}

/// Handle two-appliance comparisons
async fn handle_compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Json<Comparison> {
    Json(state.comparator.compare(&request.a, &request.b))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let recognizer = state.estimator.recognizer();
    let recognizer_config = recognizer.config();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: EngineInfo::of(recognizer.engine()),
        languages: recognizer_config.languages.codes().to_vec(),
        layout_modes: recognizer_config.modes.clone(),
        max_file_size_bytes: state.config.max_file_size,
        ocr_timeout_secs: recognizer_config.timeout.map(|t| t.as_secs()),
        max_ocr_threads: recognizer_config.max_workers,
        ocr_threads_in_flight: recognizer.workers_in_flight(),
    })
}

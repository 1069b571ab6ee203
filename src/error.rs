use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("Could not process image: {0}")]
    Decode(String),

    #[error("Recognition pass failed: {0}")]
    Recognition(String),

    #[error("Image too large (max: {max} bytes)")]
    ImageTooLarge { max: usize },

    #[error("No image file uploaded")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl LabelError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            LabelError::Initialization(_) => "INIT_ERROR",
            LabelError::Decode(_) => "UNPROCESSABLE_IMAGE",
            LabelError::Recognition(_) => "RECOGNITION_ERROR",
            LabelError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            LabelError::MissingFile => "MISSING_FILE",
            LabelError::InvalidRequest(_) => "INVALID_REQUEST",
            LabelError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            LabelError::Initialization(_)
            | LabelError::Recognition(_)
            | LabelError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LabelError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LabelError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            LabelError::MissingFile | LabelError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for LabelError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

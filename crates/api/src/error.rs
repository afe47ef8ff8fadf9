//! API Error Types

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use image_pipeline::ImageError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;

/// Message returned for processing failures when details are hidden
pub const GENERIC_PROCESSING_ERROR: &str = "Failed to process image";

/// Errors returned to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carried no `image` field
    #[error("No image provided")]
    MissingImage,

    /// The multipart body could not be read
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// Decoding, inference or encoding failed
    #[error("{0}")]
    Processing(String),
}

/// Failures of the decode, inference and encode pipeline
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Processing task aborted: {0}")]
    Task(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert a pipeline failure, optionally hiding its message
    pub fn processing(err: &ProcessingError, expose_details: bool) -> Self {
        if expose_details {
            ApiError::Processing(err.to_string())
        } else {
            ApiError::Processing(GENERIC_PROCESSING_ERROR.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors that stop the server from starting or running
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Model(#[from] InferenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

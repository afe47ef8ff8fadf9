//! Deblur Route

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use image_pipeline::{decode, encode_png, postprocess, preprocess};
use inference_engine::InferenceEngine;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{ApiError, ProcessingError};
use crate::AppState;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Deblur one uploaded image and return it as PNG
pub async fn deblur_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let multipart = multipart.map_err(|e| {
        debug!("Rejected non-multipart upload: {}", e);
        ApiError::MissingImage
    })?;

    let bytes = read_image_field(multipart).await?;
    info!("Received image upload: {} bytes", bytes.len());

    let engine = state.engine.clone();
    let result = tokio::task::spawn_blocking(move || process(&engine, &bytes))
        .await
        .map_err(|e| ProcessingError::Task(e.to_string()))
        .and_then(|r| r);

    match result {
        Ok(png) => Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response()),
        Err(e) => {
            error!("Deblur failed: {}", e);
            Err(ApiError::processing(&e, state.expose_error_details))
        }
    }
}

/// Return the first `image` field, skipping any others
async fn read_image_field(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(field.bytes().await?);
        }
        debug!("Ignoring multipart field {:?}", field.name());
    }
    Err(ApiError::MissingImage)
}

/// Decode, normalize, run the generator and encode the result
fn process(engine: &InferenceEngine, bytes: &[u8]) -> Result<Vec<u8>, ProcessingError> {
    let image = decode(bytes)?;
    debug!("Decoded {}x{} {:?} image", image.width(), image.height(), image.color());

    let tensor = preprocess(&image);
    let result = engine.predict(&tensor)?;
    info!("Inference completed in {}ms", result.latency_ms);

    let output = postprocess(&result.output)?;
    Ok(encode_png(&output)?)
}

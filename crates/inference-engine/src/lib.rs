//! Deblur Inference Engine
//!
//! Runs the pretrained deblur generator behind a `Generator` trait so the HTTP
//! layer never depends on a concrete model runtime.

mod engine;
mod generator;
mod onnx;

pub use engine::{EngineConfig, InferenceEngine, InferenceResult};
pub use generator::{Generator, PassthroughGenerator};
pub use onnx::OnnxGenerator;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}

//! ONNX generator backed by tract

use std::path::Path;

use image_pipeline::{ImageTensor, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::{Generator, InferenceError};

/// NHWC shape of the exported generator input, batch of one
const BATCH_SHAPE: [usize; 4] = [1, INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS];

/// Deblur generator exported to ONNX
pub struct OnnxGenerator {
    name: String,
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxGenerator {
    /// Load, optimize and plan the model at `path`
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading generator model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(BATCH_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        info!("Generator model {} ready", name);
        Ok(Self { name, plan })
    }
}

impl Generator for OnnxGenerator {
    fn predict(&self, input: &ImageTensor) -> Result<ImageTensor, InferenceError> {
        let contiguous = input.as_standard_layout();
        let data = contiguous.as_slice().ok_or_else(|| {
            InferenceError::InferenceFailed("input tensor is not contiguous".to_string())
        })?;

        let batch = Tensor::from_shape::<f32>(&BATCH_SHAPE, data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(batch.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs.first().ok_or_else(|| {
            InferenceError::InferenceFailed("model produced no outputs".to_string())
        })?;
        debug!("Generator output shape {:?}", output.shape());

        if output.shape() != BATCH_SHAPE {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{:?}", BATCH_SHAPE),
                actual: format!("{:?}", output.shape()),
            });
        }

        let values = output
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        ImageTensor::from_shape_vec((INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS), values.to_vec())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

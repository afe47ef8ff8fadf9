//! Inference Engine Implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image_pipeline::{ImageTensor, INPUT_SHAPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{Generator, InferenceError, OnnxGenerator, PassthroughGenerator};

/// Model loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the exported generator weights
    pub model_path: PathBuf,
    /// Refuse to start when the weight file is missing
    pub require_weights: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("weight/generator.onnx"),
            require_weights: false,
        }
    }
}

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Generator output, same shape as the input
    pub output: ImageTensor,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Loaded generator shared read-only by all requests
#[derive(Clone)]
pub struct InferenceEngine {
    generator: Arc<dyn Generator>,
    weights_loaded: bool,
}

impl InferenceEngine {
    /// Load the generator described by `config`.
    ///
    /// A missing weight file falls back to [`PassthroughGenerator`] unless
    /// `require_weights` is set. A weight file that exists but cannot be
    /// loaded is always an error.
    pub fn load(config: &EngineConfig) -> Result<Self, InferenceError> {
        let path: &Path = &config.model_path;

        if !path.exists() {
            if config.require_weights {
                error!("Model weights not found at {}", path.display());
                return Err(InferenceError::ModelLoadError(format!(
                    "weights not found at {}",
                    path.display()
                )));
            }

            warn!(
                "Model weights not found at {}! Serving with an unweighted passthrough generator",
                path.display()
            );
            return Ok(Self::with_generator(Arc::new(PassthroughGenerator), false));
        }

        let generator = OnnxGenerator::load(path)?;
        info!("Model loaded from {}", path.display());
        Ok(Self::with_generator(Arc::new(generator), true))
    }

    /// Wrap an already constructed generator
    pub fn with_generator(generator: Arc<dyn Generator>, weights_loaded: bool) -> Self {
        info!(
            "Creating inference engine: generator={}, weights_loaded={}",
            generator.name(),
            weights_loaded
        );
        Self {
            generator,
            weights_loaded,
        }
    }

    /// Run exactly one forward pass.
    ///
    /// Both the input and the generator output must be 256x256x3.
    pub fn predict(&self, input: &ImageTensor) -> Result<InferenceResult, InferenceError> {
        check_shape(input)?;

        let start = Instant::now();
        let output = self.generator.predict(input)?;
        check_shape(&output)?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!("Inference completed in {}ms", latency_ms);

        Ok(InferenceResult { output, latency_ms })
    }

    /// Whether weight data was found and loaded at startup
    pub fn weights_loaded(&self) -> bool {
        self.weights_loaded
    }

    /// Name of the generator serving requests, for logs and diagnostics
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }
}

fn check_shape(tensor: &ImageTensor) -> Result<(), InferenceError> {
    if tensor.shape() != INPUT_SHAPE {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("{:?}", INPUT_SHAPE),
            actual: format!("{:?}", tensor.shape()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Inverts every value, so tests can tell it ran
    struct NegatingGenerator;

    impl Generator for NegatingGenerator {
        fn predict(&self, input: &ImageTensor) -> Result<ImageTensor, InferenceError> {
            Ok(input.mapv(|v| -v))
        }

        fn name(&self) -> &str {
            "negating"
        }
    }

    /// Returns a tensor of the wrong shape
    struct ShrinkingGenerator;

    impl Generator for ShrinkingGenerator {
        fn predict(&self, _input: &ImageTensor) -> Result<ImageTensor, InferenceError> {
            Ok(ImageTensor::zeros((128, 128, 3)))
        }

        fn name(&self) -> &str {
            "shrinking"
        }
    }

    fn input() -> ImageTensor {
        ImageTensor::from_elem((256, 256, 3), 0.5)
    }

    #[test]
    fn test_missing_weights_fall_back_to_passthrough() {
        let config = EngineConfig {
            model_path: PathBuf::from("no/such/generator.onnx"),
            require_weights: false,
        };

        let engine = InferenceEngine::load(&config).unwrap();
        assert!(!engine.weights_loaded());
        assert_eq!(engine.generator_name(), "passthrough");

        let result = engine.predict(&input()).unwrap();
        assert_eq!(result.output, input());
    }

    #[test]
    fn test_missing_weights_rejected_when_required() {
        let config = EngineConfig {
            model_path: PathBuf::from("no/such/generator.onnx"),
            require_weights: true,
        };

        let result = InferenceEngine::load(&config);
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_present_weights_load_onnx_generator() {
        let config = EngineConfig {
            model_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/negate.onnx"),
            require_weights: true,
        };

        let engine = InferenceEngine::load(&config).unwrap();
        assert!(engine.weights_loaded());
        assert_eq!(engine.generator_name(), "negate");

        let result = engine.predict(&input()).unwrap();
        assert_eq!(result.output, ImageTensor::from_elem((256, 256, 3), -0.5));
    }

    #[test]
    fn test_corrupt_weights_are_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xde, 0xad, 0xbe, 0xef]).unwrap();

        let config = EngineConfig {
            model_path: file.path().to_path_buf(),
            require_weights: false,
        };
        assert!(InferenceEngine::load(&config).is_err());
    }

    #[test]
    fn test_predict_runs_injected_generator() {
        let engine = InferenceEngine::with_generator(Arc::new(NegatingGenerator), true);
        assert!(engine.weights_loaded());

        let result = engine.predict(&input()).unwrap();
        assert_eq!(result.output[[0, 0, 0]], -0.5);
    }

    #[test]
    fn test_predict_rejects_wrong_input_shape() {
        let engine = InferenceEngine::with_generator(Arc::new(PassthroughGenerator), false);
        let result = engine.predict(&ImageTensor::zeros((256, 256, 1)));
        assert!(matches!(result, Err(InferenceError::InvalidInputShape { .. })));
    }

    #[test]
    fn test_predict_rejects_wrong_output_shape() {
        let engine = InferenceEngine::with_generator(Arc::new(ShrinkingGenerator), true);
        let result = engine.predict(&input());
        assert!(matches!(result, Err(InferenceError::InvalidInputShape { .. })));
    }
}

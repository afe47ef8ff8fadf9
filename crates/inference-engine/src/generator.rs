//! Generator abstraction

use image_pipeline::ImageTensor;

use crate::InferenceError;

/// A pretrained image-to-image network.
///
/// Implementations are loaded once and then only read, so a single instance
/// is shared by every request.
pub trait Generator: Send + Sync {
    /// Run one forward pass on a normalized 256x256x3 tensor
    fn predict(&self, input: &ImageTensor) -> Result<ImageTensor, InferenceError>;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Stand-in used when no weight file is available.
///
/// Returns its input unchanged, so responses are well-formed but not deblurred.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughGenerator;

impl Generator for PassthroughGenerator {
    fn predict(&self, input: &ImageTensor) -> Result<ImageTensor, InferenceError> {
        Ok(input.clone())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

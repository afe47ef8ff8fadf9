//! Image Pipeline
//!
//! Converts uploaded image bytes into the fixed-shape tensor the deblur
//! generator expects, and turns generator output back into PNG bytes.
//! Provides:
//! - Decoding of any raster format the `image` crate understands
//! - Lanczos resampling to 256x256 and three-channel conversion
//! - Linear normalization into [-1, 1] and its inverse
//! - Lossless PNG encoding
//! - Side-by-side composition for before/after comparisons

pub mod codec;
pub mod compose;
pub mod tensor;

pub use codec::{decode, encode_png};
pub use compose::side_by_side;
pub use tensor::{denormalize, normalize, postprocess, preprocess, ImageTensor};

use thiserror::Error;

/// Height of the generator input in pixels
pub const INPUT_HEIGHT: usize = 256;
/// Width of the generator input in pixels
pub const INPUT_WIDTH: usize = 256;
/// Number of color channels of the generator input
pub const INPUT_CHANNELS: usize = 3;

/// Shape every tensor must have at the inference boundary
pub const INPUT_SHAPE: [usize; 3] = [INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS];

/// Image pipeline errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid tensor shape: expected {expected}, got {actual}")]
    InvalidShape { expected: String, actual: String },
}

//! Image decoding and PNG encoding

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};

use crate::ImageError;

/// Decode an encoded image buffer, guessing the format from its content
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("empty image buffer".to_string()));
    }

    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

/// Encode an RGB image as PNG
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buf)
}

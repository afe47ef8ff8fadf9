//! Tensor conversion and pixel normalization

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array3;
use tracing::debug;

use crate::{ImageError, INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};

/// Height x width x channels array of normalized pixel values
pub type ImageTensor = Array3<f32>;

/// Half of the 8-bit pixel range; the generator was trained on `p / 127.5 - 1`
const PIXEL_SCALE: f32 = 127.5;

/// Map an 8-bit pixel value into [-1, 1]
pub fn normalize(pixel: u8) -> f32 {
    pixel as f32 / PIXEL_SCALE - 1.0
}

/// Map a generator output value back into an 8-bit pixel.
///
/// Values outside [-1, 1] saturate instead of wrapping.
pub fn denormalize(value: f32) -> u8 {
    (value * PIXEL_SCALE + PIXEL_SCALE).round().clamp(0.0, 255.0) as u8
}

/// Resize, convert to RGB and normalize a decoded image.
///
/// Images that are not already 256x256 are resampled with a Lanczos filter;
/// aspect ratio is not preserved. Grayscale is replicated across the three
/// channels and alpha is dropped.
pub fn preprocess(image: &DynamicImage) -> ImageTensor {
    let (width, height) = image.dimensions();
    let target = (INPUT_WIDTH as u32, INPUT_HEIGHT as u32);

    let rgb = if (width, height) != target {
        debug!("Resizing {}x{} input to {}x{}", width, height, target.0, target.1);
        image
            .resize_exact(target.0, target.1, FilterType::Lanczos3)
            .to_rgb8()
    } else {
        image.to_rgb8()
    };

    Array3::from_shape_fn((INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS), |(y, x, c)| {
        normalize(rgb.get_pixel(x as u32, y as u32)[c])
    })
}

/// Denormalize a generator output tensor into an RGB image
pub fn postprocess(tensor: &ImageTensor) -> Result<RgbImage, ImageError> {
    let (height, width, channels) = tensor.dim();
    if channels != INPUT_CHANNELS || height == 0 || width == 0 {
        return Err(ImageError::InvalidShape {
            expected: format!("[H, W, {}]", INPUT_CHANNELS),
            actual: format!("{:?}", tensor.shape()),
        });
    }

    let mut image = RgbImage::new(width as u32, height as u32);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        for c in 0..INPUT_CHANNELS {
            pixel[c] = denormalize(tensor[[y as usize, x as usize, c]]);
        }
    }

    Ok(image)
}

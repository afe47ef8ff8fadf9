//! Before/after comparison rendering

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Place two images next to each other, left then right.
///
/// The taller image sets the canvas height; the other one is scaled to match,
/// keeping its aspect ratio.
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> RgbImage {
    let height = left.height().max(right.height());
    let left = fit_height(left, height);
    let right = fit_height(right, height);

    let mut canvas = RgbImage::new(left.width() + right.width(), height);
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, left.width() as i64, 0);
    canvas
}

fn fit_height(image: &RgbImage, height: u32) -> RgbImage {
    if image.height() == height || image.height() == 0 {
        return image.clone();
    }

    let width = (image.width() as u64 * height as u64 / image.height() as u64).max(1) as u32;
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

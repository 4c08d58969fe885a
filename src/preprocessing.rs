//! Tensor encoding for model inference
//!
//! Converts a decoded image into the normalized, channel-major `[1, 3, H, W]`
//! tensor the segmentation model expects. The resample is a stretch fill:
//! both axes are scaled independently onto the target box, with no
//! letterboxing and no aspect preservation. The numeric core
//! ([`rgb_to_tensor`]) is a pure function over the resampled RGB buffer so it
//! can be tested without any resampler.

use crate::{error::Result, types::NormalizationParams, utils::numeric};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

/// Floor for the global scale divisor, so an all-black image divides by a
/// small constant instead of zero.
pub const MIN_SCALE_DIVISOR: f32 = 1e-6;

/// Stretch-resize an image to exactly `width x height` and force it into
/// 3-channel interleaved byte form. Alpha or extra channels are dropped.
#[must_use]
pub fn stretch_to_rgb(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.dimensions() == (width, height) {
        return rgb;
    }
    image::imageops::resize(&rgb, width, height, image::imageops::FilterType::Triangle)
}

/// Convert a resampled RGB buffer to a normalized `[1, 3, H, W]` tensor.
///
/// Every byte is first divided by the global maximum of the buffer (floored
/// at [`MIN_SCALE_DIVISOR`]), putting the scaled values in `[0, 1]`, then
/// shifted and scaled per channel with `(value - mean[c]) / std[c]` while
/// being reordered from interleaved HWC into channel-major CHW. The affine
/// step is per pixel per channel; no spatial mixing happens here.
#[must_use]
pub fn rgb_to_tensor(rgb: &RgbImage, params: &NormalizationParams) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let divisor = f32::from(numeric::max_byte(rgb.as_raw())).max(MIN_SCALE_DIVISOR);

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let scaled = f32::from(pixel[c]) / divisor;
            tensor[[0, c, y as usize, x as usize]] = (scaled - params.mean[c]) / params.std[c];
        }
    }

    tensor
}

/// Encode an image into the model's input tensor.
///
/// The element count of the result is exactly `3 * target_height *
/// target_width`. Its value range depends on `params`; only the
/// pre-normalization scaled values are bounded to `[0, 1]`.
pub fn encode_tensor(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    params: &NormalizationParams,
) -> Result<Array4<f32>> {
    let rgb = stretch_to_rgb(image, target_width, target_height);
    Ok(rgb_to_tensor(&rgb, params))
}

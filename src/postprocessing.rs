//! Mask decoding and alpha compositing
//!
//! Turns the model's raw `[1, 1, H', W']` output into a displayable alpha
//! mask and merges it onto the original image. The mask is min/max rescaled
//! at the model's native resolution, then stretch-resized to the original
//! image's dimensions; the composited result is always at the original size,
//! never the model's.

use crate::{
    error::Result,
    inference::RawOutput,
    types::AlphaMask,
    utils::numeric,
};
use image::DynamicImage;

/// Unit-interval value emitted for every pixel when the raw output has no
/// usable dynamic range (uniform output). 0.5 maps to mask byte 128.
pub const FLAT_MASK_VALUE: f32 = 0.5;

/// Decode the raw model output into an alpha mask at the model's native
/// resolution.
///
/// Only the first channel plane is read. Values are rescaled with
/// `(v - min) / (max - min)` to a best-effort `[0, 1]` range, clamped, and
/// rounded to bytes. A degenerate output, where the plane has no positive
/// finite range, yields a flat mid-gray mask instead of propagating
/// undefined values.
pub fn decode_mask(raw: &RawOutput) -> Result<AlphaMask> {
    let (height, width) = raw.spatial()?;
    let plane = raw.first_plane()?;

    let range = numeric::min_max(plane);
    let data: Vec<u8> = match range {
        Some((min, max)) if (max - min).is_normal() && max > min => plane
            .iter()
            .map(|&v| numeric::unit_to_byte((v - min) / (max - min)))
            .collect(),
        // Uniform (or all-NaN) output: defined fallback, never NaN bytes
        _ => vec![numeric::unit_to_byte(FLAT_MASK_VALUE); plane.len()],
    };

    Ok(AlphaMask::new(data, (width as u32, height as u32)))
}

/// Decode the raw output, stretch the mask to the original image's
/// dimensions, and attach it as the alpha channel of an RGBA copy of the
/// original.
///
/// The original image is read, never mutated; the returned image always has
/// the original's exact dimensions and is ready for lossless encoding.
pub fn composite_mask(raw: &RawOutput, original: &DynamicImage) -> Result<DynamicImage> {
    let native_mask = decode_mask(raw)?;

    let (orig_width, orig_height) = (original.width(), original.height());
    let mask = if native_mask.dimensions == (orig_width, orig_height) {
        native_mask
    } else {
        native_mask.resize(orig_width, orig_height)?
    };

    // to_rgba8 forces RGB colorspace and adds a fully-opaque alpha channel
    // when the source has none; the mask then replaces that alpha.
    let mut rgba = original.to_rgba8();
    mask.apply_to_image(&mut rgba)?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::RawOutput;
    use image::{GenericImageView, ImageBuffer, Rgb};

    fn raw(dims: Vec<usize>, data: Vec<f32>) -> RawOutput {
        RawOutput::new(dims, data).unwrap()
    }

    #[test]
    fn test_decode_rescales_to_full_byte_range() {
        let output = raw(vec![1, 1, 2, 2], vec![0.0, 0.5, 0.5, 1.0]);
        let mask = decode_mask(&output).unwrap();
        assert_eq!(mask.dimensions, (2, 2));
        assert_eq!(mask.data, vec![0, 128, 128, 255]);
    }

    #[test]
    fn test_decode_shifts_arbitrary_ranges() {
        // min -4, max 4: rescale is (v + 4) / 8
        let output = raw(vec![1, 1, 1, 4], vec![-4.0, -2.0, 2.0, 4.0]);
        let mask = decode_mask(&output).unwrap();
        assert_eq!(mask.data, vec![0, 64, 191, 255]);
    }

    #[test]
    fn test_degenerate_uniform_output_yields_flat_mask() {
        let output = raw(vec![1, 1, 3, 3], vec![0.7; 9]);
        let mask = decode_mask(&output).unwrap();
        assert!(mask.data.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_decode_never_emits_nan_bytes() {
        // All-NaN plane falls back to the flat mask as well
        let output = raw(vec![1, 1, 1, 2], vec![f32::NAN, f32::NAN]);
        let mask = decode_mask(&output).unwrap();
        assert_eq!(mask.data, vec![128, 128]);
    }

    #[test]
    fn test_decode_reads_only_first_channel() {
        let mut data = vec![0.0, 1.0, 0.5, 0.25];
        data.extend([9.0; 4]); // second channel plane, must be ignored
        let output = raw(vec![1, 2, 2, 2], data);
        let mask = decode_mask(&output).unwrap();
        assert_eq!(mask.data, vec![0, 255, 128, 64]);
    }

    #[test]
    fn test_composite_output_has_original_dimensions() {
        let original = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            10,
            6,
            Rgb([50, 100, 150]),
        ));
        // Model's native resolution differs from the original on both axes
        let output = raw(vec![1, 1, 3, 4], (0..12).map(|v| v as f32).collect());

        let composited = composite_mask(&output, &original).unwrap();
        assert_eq!(composited.dimensions(), (10, 6));
        assert_eq!(composited.color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_composite_preserves_color_channels() {
        let original =
            DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([50, 100, 150])));
        let output = raw(vec![1, 1, 2, 2], vec![0.0, 1.0, 1.0, 0.0]);

        let composited = composite_mask(&output, &original).unwrap().to_rgba8();
        assert!(composited
            .pixels()
            .all(|p| p[0] == 50 && p[1] == 100 && p[2] == 150));
    }

    #[test]
    fn test_composite_replaces_existing_alpha() {
        let rgba = ImageBuffer::from_pixel(2, 2, image::Rgba([10, 20, 30, 3]));
        let original = DynamicImage::ImageRgba8(rgba);
        let output = raw(vec![1, 1, 2, 2], vec![1.0; 4]);

        let composited = composite_mask(&output, &original).unwrap().to_rgba8();
        // Uniform output -> flat 128 alpha, replacing the old alpha of 3
        assert!(composited.pixels().all(|p| p[3] == 128));
    }
}

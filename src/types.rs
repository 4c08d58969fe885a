//! Core types for the matting pipeline

use crate::error::Result;
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-channel normalization applied during tensor encoding.
///
/// One mean/std pair per RGB channel, supplied once at pipeline construction
/// and immutable for the pipeline's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    /// Per-channel mean, subtracted after max-scaling (R, G, B)
    pub mean: [f32; 3],
    /// Per-channel standard deviation divisor (R, G, B)
    pub std: [f32; 3],
}

impl NormalizationParams {
    /// Create normalization parameters from explicit triples
    #[must_use]
    pub const fn new(mean: [f32; 3], std: [f32; 3]) -> Self {
        Self { mean, std }
    }

    /// Identity normalization: tensor values equal the max-scaled pixel values
    #[must_use]
    pub const fn identity() -> Self {
        Self::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
    }
}

impl Default for NormalizationParams {
    /// The ImageNet triples used by the common portrait segmentation models
    fn default() -> Self {
        Self::new([0.485, 0.456, 0.406], [0.229, 0.224, 0.225])
    }
}

/// Single-channel opacity mask (0-255 per pixel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaMask {
    /// Mask data as grayscale values (0-255), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl AlphaMask {
    /// Create a new alpha mask from raw bytes
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create a mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &ImageBuffer<image::Luma<u8>, Vec<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.as_raw().clone(), (width, height))
    }

    /// Convert the mask to a grayscale image
    pub fn to_image(&self) -> Result<ImageBuffer<image::Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            crate::error::MatteError::processing("Mask buffer does not match its dimensions")
        })
    }

    /// Stretch-resize the mask to new dimensions.
    ///
    /// Both axes are scaled independently onto the target box; aspect ratio
    /// is intentionally not preserved, matching the encode-side resample.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<AlphaMask> {
        let current = self.to_image()?;
        let resized = image::imageops::resize(
            &current,
            new_width,
            new_height,
            image::imageops::FilterType::Triangle,
        );
        Ok(AlphaMask::from_image(&resized))
    }

    /// Replace the alpha channel of an RGBA image with this mask.
    pub fn apply_to_image(&self, image: &mut ImageBuffer<Rgba<u8>, Vec<u8>>) -> Result<()> {
        let (img_width, img_height) = image.dimensions();
        if (img_width, img_height) != self.dimensions {
            return Err(crate::error::MatteError::processing(format!(
                "Image ({img_width}x{img_height}) and mask ({}x{}) dimensions do not match",
                self.dimensions.0, self.dimensions.1
            )));
        }

        for (pixel, &alpha) in image.pixels_mut().zip(&self.data) {
            pixel[3] = alpha;
        }

        Ok(())
    }

    /// Fraction of pixels considered foreground (alpha above 127)
    #[must_use]
    pub fn foreground_ratio(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let foreground = self.data.iter().filter(|&&a| a > 127).count();
        foreground as f32 / self.data.len() as f32
    }

    /// Save the mask as a grayscale PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let image = self.to_image()?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

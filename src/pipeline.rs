//! Pipeline orchestration
//!
//! Strict per-image sequence: query session metadata, encode, infer,
//! decode, composite. The encoder and decoder are stateless transforms, so a
//! pipeline holds no mutable state of its own between calls; any failure in
//! any stage aborts the whole operation with no retries and no partial
//! result.

use crate::{
    error::Result,
    inference::InferenceSession,
    postprocessing, preprocessing,
    types::NormalizationParams,
};
use image::DynamicImage;
use log::{debug, info};
use ndarray::Array4;
use std::time::Instant;

/// Matting pipeline: one session handle plus immutable normalization
/// parameters.
pub struct MattePipeline<S: InferenceSession> {
    session: S,
    params: NormalizationParams,
}

impl<S: InferenceSession> MattePipeline<S> {
    /// Create a pipeline around an inference session and normalization
    /// parameters. The parameters are fixed for the pipeline's lifetime.
    pub fn new(session: S, params: NormalizationParams) -> Self {
        Self { session, params }
    }

    /// Encode an image into the tensor the session's model expects.
    ///
    /// Exposed separately from [`Self::produce_masked_image`] so the encode
    /// path can be inspected and tested without running inference.
    ///
    /// # Errors
    /// - Session metadata fails validation (`MatteError::Metadata`)
    pub fn build_input_tensor(&self, image: &DynamicImage) -> Result<Array4<f32>> {
        let metadata = self.session.input_metadata()?;
        preprocessing::encode_tensor(
            image,
            metadata.width as u32,
            metadata.height as u32,
            &self.params,
        )
    }

    /// Run the full pipeline on one image and return the composited RGBA
    /// result at the original image's dimensions.
    ///
    /// # Errors
    /// - `MatteError::Metadata` if the session's declared input shape is
    ///   unusable (checked before any image work)
    /// - `MatteError::Inference` if the model run faults
    /// - `MatteError::Image`/`MatteError::Processing` from the image
    ///   collaborator or the numeric stages
    pub fn produce_masked_image(&mut self, image: &DynamicImage) -> Result<DynamicImage> {
        let total_start = Instant::now();

        // Metadata first, so a misdeclared model fails before any image work
        let metadata = self.session.input_metadata()?;
        let output_name = self.session.output_name()?;
        let original_dimensions = (image.width(), image.height());
        debug!(
            "Encoding {}x{} image for model input '{}' ({}x{})",
            original_dimensions.0, original_dimensions.1,
            metadata.name, metadata.width, metadata.height,
        );

        let encode_start = Instant::now();
        let tensor = preprocessing::encode_tensor(
            image,
            metadata.width as u32,
            metadata.height as u32,
            &self.params,
        )?;
        debug!(
            "Tensor encoding completed in {}ms",
            encode_start.elapsed().as_millis()
        );

        let inference_start = Instant::now();
        let raw = self.session.run(&metadata.name, &tensor)?;
        debug!(
            "Inference completed in {}ms, output '{}' dims {:?}",
            inference_start.elapsed().as_millis(),
            output_name,
            raw.dims,
        );

        let decode_start = Instant::now();
        let composited = postprocessing::composite_mask(&raw, image)?;
        debug!(
            "Mask decode and composite completed in {}ms",
            decode_start.elapsed().as_millis()
        );

        info!(
            "Matted {}x{} image in {}ms",
            original_dimensions.0,
            original_dimensions.1,
            total_start.elapsed().as_millis()
        );
        Ok(composited)
    }

    /// The normalization parameters this pipeline was built with.
    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Access the underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockSession;
    use crate::inference::RawOutput;
    use image::{GenericImageView, ImageBuffer, Rgb};

    fn gray_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([128, 128, 128])))
    }

    #[test]
    fn test_build_input_tensor_uses_declared_size() {
        let output = RawOutput::new(vec![1, 1, 2, 2], vec![0.0; 4]).unwrap();
        let session = MockSession::returning(8, 6, output);
        let pipeline = MattePipeline::new(session, NormalizationParams::identity());

        let tensor = pipeline.build_input_tensor(&gray_image(100, 50)).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 8, 6]);
    }

    #[test]
    fn test_produce_masked_image_passes_declared_input_name() {
        let output = RawOutput::new(vec![1, 1, 2, 2], vec![0.0, 0.5, 0.5, 1.0]).unwrap();
        let session = MockSession::returning(2, 2, output).with_input_name("pixel_values");
        let mut pipeline = MattePipeline::new(session, NormalizationParams::identity());

        pipeline.produce_masked_image(&gray_image(4, 4)).unwrap();
        let (name, shape) = pipeline.session().last_run.clone().unwrap();
        assert_eq!(name, "pixel_values");
        assert_eq!(shape, vec![1, 3, 2, 2]);
    }

    #[test]
    fn test_produce_masked_image_restores_original_dimensions() {
        let output = RawOutput::new(vec![1, 1, 3, 3], vec![0.5; 9]).unwrap();
        let session = MockSession::returning(3, 3, output);
        let mut pipeline = MattePipeline::new(session, NormalizationParams::default());

        let result = pipeline.produce_masked_image(&gray_image(17, 11)).unwrap();
        assert_eq!(result.dimensions(), (17, 11));
    }

    #[test]
    fn test_inference_failure_aborts_pipeline() {
        let session = MockSession::failing(2, 2, "backend fault");
        let mut pipeline = MattePipeline::new(session, NormalizationParams::default());

        let err = pipeline.produce_masked_image(&gray_image(4, 4)).unwrap_err();
        assert!(matches!(err, crate::error::MatteError::Inference(_)));
    }
}

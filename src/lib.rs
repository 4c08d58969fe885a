//! # alphamatte
//!
//! Tensor encoding and alpha-mask compositing around a pretrained
//! segmentation model. The crate converts an arbitrary input photograph into
//! the `[1, 3, H, W]` f32 tensor the model expects, and converts the model's
//! raw `[1, 1, H', W']` output back into a spatially-correct alpha mask
//! composited onto the original pixels.
//!
//! Model execution itself is an external collaborator consumed through the
//! [`InferenceSession`] trait; an ONNX Runtime adapter ships behind the
//! `onnx` feature (default), and [`MockSession`] substitutes synthetic
//! outputs for tests.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use alphamatte::{MattePipeline, NormalizationParams, OnnxSession};
//!
//! # fn example() -> alphamatte::Result<()> {
//! let session = OnnxSession::from_file("segmentation.onnx")?;
//! let mut pipeline = MattePipeline::new(session, NormalizationParams::default());
//!
//! let image = image::open("photo.jpg")?;
//! let composited = pipeline.produce_masked_image(&image)?;
//! composited.save_with_format("cutout.png", image::ImageFormat::Png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline shape
//!
//! Per image, strictly in sequence: session metadata query → tensor encode
//! (stretch resize, global max scaling, per-channel normalization, HWC→CHW)
//! → inference → mask decode (min/max rescale with a defined flat-mask
//! fallback for uniform outputs) → stretch back to the original dimensions →
//! alpha composite. Encoder and decoder share no state; a pipeline instance
//! is stateless between calls.

pub mod backends;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod postprocessing;
pub mod preprocessing;
pub mod types;
pub mod utils;

// Public API exports
pub use backends::MockSession;
#[cfg(feature = "onnx")]
pub use backends::OnnxSession;
pub use error::{MatteError, Result};
pub use inference::{InferenceSession, InputMetadata, RawOutput};
pub use pipeline::MattePipeline;
pub use postprocessing::{composite_mask, decode_mask, FLAT_MASK_VALUE};
pub use preprocessing::{encode_tensor, rgb_to_tensor, stretch_to_rgb, MIN_SCALE_DIVISOR};
pub use types::{AlphaMask, NormalizationParams};

/// Run the pipeline on encoded image bytes and return lossless PNG bytes.
///
/// Decodes via the `image` crate (JPEG, PNG, TIFF with default features),
/// produces the composited RGBA image, and encodes it as PNG so the alpha
/// channel survives.
///
/// # Errors
/// - `MatteError::Image` if the bytes cannot be decoded or the result cannot
///   be encoded
/// - Any pipeline error from [`MattePipeline::produce_masked_image`]
pub fn matte_image_bytes<S: InferenceSession>(
    image_bytes: &[u8],
    pipeline: &mut MattePipeline<S>,
) -> Result<Vec<u8>> {
    let image = image::load_from_memory(image_bytes)?;
    let composited = pipeline.produce_masked_image(&image)?;

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    composited.write_to(&mut cursor, image::ImageFormat::Png)?;
    Ok(buffer)
}

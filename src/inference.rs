//! Inference boundary abstraction
//!
//! The pipeline reaches the model through [`InferenceSession`] only: it asks
//! the session for its declared input metadata and output binding name, hands
//! over one `[1, 3, H, W]` tensor, and reads back one dimensioned float
//! buffer. Everything about how the model executes (engine, providers,
//! threading) stays behind this trait.
//!
//! Concurrency note: the pipeline itself is stateless between calls, so
//! several pipeline instances may share one session only if the concrete
//! session supports concurrent `run` calls. That is a property of the
//! implementation, not a guarantee of this trait.

use crate::error::{MatteError, Result};
use ndarray::Array4;

/// Declared metadata for the model's primary input binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMetadata {
    /// Binding name the tensor must be supplied under
    pub name: String,
    /// Declared input height
    pub height: usize,
    /// Declared input width
    pub width: usize,
}

/// Raw model output: declared dimensions plus a flat data buffer.
///
/// The spatial dimensions need not match the input tensor's; models may
/// resize internally.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutput {
    /// Declared output dimensions, expected `[1, C, H', W']`
    pub dims: Vec<usize>,
    /// Flat row-major data buffer, `dims` elements in product
    pub data: Vec<f32>,
}

impl RawOutput {
    /// Create a raw output after checking the buffer against its dimensions
    pub fn new(dims: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(MatteError::processing(format!(
                "Output buffer holds {} values but dims {dims:?} require {expected}",
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Declared spatial dimensions `(height, width)`.
    ///
    /// Zero-sized spatial dimensions are rejected; there is no mask to
    /// decode from an empty plane.
    pub fn spatial(&self) -> Result<(usize, usize)> {
        if self.dims.len() != 4 {
            return Err(MatteError::processing(format!(
                "Expected 4-dimensional model output, got {:?}",
                self.dims
            )));
        }
        let (height, width) = (self.dims[2], self.dims[3]);
        if height == 0 || width == 0 {
            return Err(MatteError::processing(format!(
                "Model output has empty spatial dimensions: {:?}",
                self.dims
            )));
        }
        Ok((height, width))
    }

    /// The first channel's data plane (`H' * W'` values).
    ///
    /// Models emitting more than one channel are tolerated; the extra planes
    /// are simply never read.
    pub fn first_plane(&self) -> Result<&[f32]> {
        let (height, width) = self.spatial()?;
        let plane_len = height * width;
        self.data.get(..plane_len).ok_or_else(|| {
            MatteError::processing(format!(
                "Output buffer shorter than one {height}x{width} plane"
            ))
        })
    }
}

/// External model-execution service consumed as a request/response contract.
pub trait InferenceSession {
    /// Metadata of the primary input binding, already validated as a
    /// concrete `[N, 3, H, W]` shape.
    ///
    /// # Errors
    /// - Session metadata unavailable
    /// - Declared input shape fails [`validate_input_shape`]
    fn input_metadata(&self) -> Result<InputMetadata>;

    /// Name of the primary output binding.
    ///
    /// # Errors
    /// - Session declares no outputs
    fn output_name(&self) -> Result<String>;

    /// Execute the model on one input tensor supplied under `input_name`
    /// and return the output published under [`Self::output_name`].
    ///
    /// # Errors
    /// - Any fault raised by the underlying engine, propagated unretried
    fn run(&mut self, input_name: &str, tensor: &Array4<f32>) -> Result<RawOutput>;
}

/// Validate a declared input shape and extract its spatial size.
///
/// The shape must be 4-dimensional with exactly 3 channels and concrete
/// positive spatial dimensions. Symbolic dimensions (reported as -1 or 0)
/// are rejected: the encoder needs an exact target box, and inventing one
/// would hide a model-contract mismatch.
pub fn validate_input_shape(dims: &[i64]) -> Result<(usize, usize)> {
    if dims.len() != 4 {
        return Err(MatteError::bad_input_shape(dims));
    }
    if dims[1] != 3 {
        return Err(MatteError::bad_input_shape(dims));
    }
    let height = usize::try_from(dims[2]).ok().filter(|&h| h > 0);
    let width = usize::try_from(dims[3]).ok().filter(|&w| w > 0);
    match (height, width) {
        (Some(h), Some(w)) => Ok((h, w)),
        _ => Err(MatteError::bad_input_shape(dims)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input_shape_accepts_concrete_nchw() {
        assert_eq!(validate_input_shape(&[1, 3, 320, 480]).unwrap(), (320, 480));
    }

    #[test]
    fn test_validate_input_shape_rejects_wrong_rank() {
        assert!(validate_input_shape(&[3, 320, 320]).is_err());
        assert!(validate_input_shape(&[1, 1, 3, 320, 320]).is_err());
    }

    #[test]
    fn test_validate_input_shape_rejects_wrong_channels() {
        assert!(validate_input_shape(&[1, 1, 320, 320]).is_err());
        assert!(validate_input_shape(&[1, 4, 320, 320]).is_err());
    }

    #[test]
    fn test_validate_input_shape_rejects_dynamic_dims() {
        assert!(validate_input_shape(&[1, 3, -1, -1]).is_err());
        assert!(validate_input_shape(&[1, 3, 0, 320]).is_err());
    }

    #[test]
    fn test_raw_output_buffer_check() {
        assert!(RawOutput::new(vec![1, 1, 2, 2], vec![0.0; 4]).is_ok());
        assert!(RawOutput::new(vec![1, 1, 2, 2], vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_raw_output_first_plane_ignores_extra_channels() {
        let raw = RawOutput::new(vec![1, 2, 2, 2], (0..8).map(|v| v as f32).collect()).unwrap();
        assert_eq!(raw.spatial().unwrap(), (2, 2));
        assert_eq!(raw.first_plane().unwrap(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_raw_output_rejects_zero_spatial_dims() {
        let raw = RawOutput::new(vec![1, 1, 0, 0], vec![]).unwrap();
        assert!(raw.spatial().is_err());
        assert!(raw.first_plane().is_err());

        let raw = RawOutput::new(vec![1, 1, 4, 0], vec![]).unwrap();
        assert!(raw.spatial().is_err());
    }

    #[test]
    fn test_raw_output_rejects_wrong_rank() {
        let raw = RawOutput::new(vec![1, 4], vec![0.0; 4]).unwrap();
        assert!(raw.spatial().is_err());
        assert!(raw.first_plane().is_err());
    }
}

//! Error types for the matting pipeline

use thiserror::Error;

/// Result type alias for matting operations
pub type Result<T> = std::result::Result<T, MatteError>;

/// Error types surfaced by the matting pipeline
#[derive(Error, Debug)]
pub enum MatteError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode, resample or encode errors from the image collaborator
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The session's declared tensor metadata is unusable (wrong rank,
    /// channel count, or non-concrete spatial dimensions)
    #[error("Model metadata error: {0}")]
    Metadata(String),

    /// The inference boundary raised a fault while executing the model
    #[error("Inference error: {0}")]
    Inference(String),

    /// Numeric or buffer-handling errors inside the pipeline itself
    #[error("Processing error: {0}")]
    Processing(String),
}

impl MatteError {
    /// Create a new metadata error
    pub fn metadata<S: Into<String>>(msg: S) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a metadata error describing a rejected input shape
    pub fn bad_input_shape(dims: &[i64]) -> Self {
        Self::Metadata(format!(
            "Expected concrete [N, 3, H, W] input shape, got {dims:?}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MatteError::metadata("input is 3-dimensional");
        assert!(matches!(err, MatteError::Metadata(_)));

        let err = MatteError::inference("session run failed");
        assert!(matches!(err, MatteError::Inference(_)));
    }

    #[test]
    fn test_error_display() {
        let err = MatteError::processing("mask buffer size mismatch");
        assert_eq!(
            err.to_string(),
            "Processing error: mask buffer size mismatch"
        );
    }

    #[test]
    fn test_bad_input_shape_message() {
        let err = MatteError::bad_input_shape(&[1, 4, 320, 320]);
        let msg = err.to_string();
        assert!(msg.contains("[1, 4, 320, 320]"));
        assert!(msg.contains("[N, 3, H, W]"));
    }
}

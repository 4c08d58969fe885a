//! Mock inference session for testing and debugging
//!
//! Substitutes a synthetic raw output for a real model run, so the encoder
//! and decoder can be exercised end to end without model files.

use crate::error::{MatteError, Result};
use crate::inference::{InferenceSession, InputMetadata, RawOutput};
use ndarray::Array4;

/// Canned-response inference session.
#[derive(Debug, Clone)]
pub struct MockSession {
    metadata: InputMetadata,
    response: std::result::Result<RawOutput, String>,
    /// Input name and tensor shape of the most recent `run` call
    pub last_run: Option<(String, Vec<usize>)>,
}

impl MockSession {
    /// Session that declares a `[1, 3, height, width]` input named `input`
    /// and answers every run with the given output.
    pub fn returning(height: usize, width: usize, output: RawOutput) -> Self {
        Self {
            metadata: InputMetadata {
                name: "input".to_string(),
                height,
                width,
            },
            response: Ok(output),
            last_run: None,
        }
    }

    /// Session whose every run fails with an inference error.
    pub fn failing(height: usize, width: usize, message: &str) -> Self {
        Self {
            metadata: InputMetadata {
                name: "input".to_string(),
                height,
                width,
            },
            response: Err(message.to_string()),
            last_run: None,
        }
    }

    /// Override the declared input binding name.
    #[must_use]
    pub fn with_input_name(mut self, name: &str) -> Self {
        self.metadata.name = name.to_string();
        self
    }
}

impl InferenceSession for MockSession {
    fn input_metadata(&self) -> Result<InputMetadata> {
        Ok(self.metadata.clone())
    }

    fn output_name(&self) -> Result<String> {
        Ok("output".to_string())
    }

    fn run(&mut self, input_name: &str, tensor: &Array4<f32>) -> Result<RawOutput> {
        self.last_run = Some((input_name.to_string(), tensor.shape().to_vec()));
        match &self.response {
            Ok(output) => Ok(output.clone()),
            Err(message) => Err(MatteError::inference(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_session_returns_canned_output() {
        let canned = RawOutput::new(vec![1, 1, 2, 2], vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        let mut session = MockSession::returning(2, 2, canned.clone());

        let metadata = session.input_metadata().unwrap();
        assert_eq!(metadata.name, "input");
        assert_eq!((metadata.height, metadata.width), (2, 2));

        let tensor = Array4::<f32>::zeros((1, 3, 2, 2));
        let output = session.run(&metadata.name, &tensor).unwrap();
        assert_eq!(output, canned);
        assert_eq!(
            session.last_run,
            Some(("input".to_string(), vec![1, 3, 2, 2]))
        );
    }

    #[test]
    fn test_mock_session_failure_propagates() {
        let mut session = MockSession::failing(4, 4, "provider exploded");
        let tensor = Array4::<f32>::zeros((1, 3, 4, 4));
        let err = session.run("input", &tensor).unwrap_err();
        assert!(matches!(err, MatteError::Inference(_)));
    }
}

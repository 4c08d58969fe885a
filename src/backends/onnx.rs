//! ONNX Runtime session adapter
//!
//! Wraps an `ort` session behind the [`InferenceSession`] trait. Input and
//! output binding names and the declared input shape are read from the
//! session's own metadata, never hardcoded.
//!
//! One `OnnxSession` owns one `ort` session; `run` takes `&mut self`, so
//! concurrent use requires one adapter per thread.

use crate::error::{MatteError, Result};
use crate::inference::{self, InferenceSession, InputMetadata, RawOutput};
use log;
use ndarray::Array4;
use ort::ep::{CoreML as CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider, CUDA as CUDAExecutionProvider};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Value, ValueType};
use std::path::Path;

/// ONNX Runtime backed inference session
#[derive(Debug)]
pub struct OnnxSession {
    session: Session,
}

impl OnnxSession {
    /// Load a model from a file on disk.
    ///
    /// # Errors
    /// - Session construction or model parsing failures
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let session = Self::session_builder()?
            .commit_from_file(path.as_ref())
            .map_err(|e| {
                MatteError::inference(format!(
                    "Failed to create session from '{}': {e}",
                    path.as_ref().display()
                ))
            })?;
        Ok(Self { session })
    }

    /// Load a model from an in-memory buffer.
    ///
    /// # Errors
    /// - Session construction or model parsing failures
    pub fn from_memory(model_data: &[u8]) -> Result<Self> {
        let session = Self::session_builder()?
            .commit_from_memory(model_data)
            .map_err(|e| {
                MatteError::inference(format!("Failed to create session from model data: {e}"))
            })?;
        Ok(Self { session })
    }

    /// Builder with Level3 graph optimization, auto-detected hardware
    /// execution providers (CUDA, then CoreML, then CPU) and thread counts
    /// derived from the available parallelism.
    fn session_builder() -> Result<ort::session::builder::SessionBuilder> {
        let mut builder = Session::builder()
            .map_err(|e| MatteError::inference(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MatteError::inference(format!("Failed to set optimization level: {e}")))?;

        let mut providers = Vec::new();
        let cuda = CUDAExecutionProvider::default();
        if OrtExecutionProvider::is_available(&cuda).unwrap_or(false) {
            log::info!("CUDA execution provider is available and will be used");
            providers.push(cuda.build());
        }
        let coreml = CoreMLExecutionProvider::default();
        if OrtExecutionProvider::is_available(&coreml).unwrap_or(false) {
            log::info!("CoreML execution provider is available and will be used");
            providers.push(coreml.build());
        }
        if providers.is_empty() {
            log::debug!("No hardware acceleration available, using CPU");
        } else {
            builder = builder.with_execution_providers(providers).map_err(|e| {
                MatteError::inference(format!("Failed to set execution providers: {e}"))
            })?;
        }

        let parallelism = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(8);
        let builder = builder
            .with_intra_threads(parallelism)
            .map_err(|e| MatteError::inference(format!("Failed to set intra threads: {e}")))?
            .with_inter_threads((parallelism / 4).max(1))
            .map_err(|e| MatteError::inference(format!("Failed to set inter threads: {e}")))?;

        Ok(builder)
    }

    /// Declared dimensions of the primary input binding, as reported by the
    /// session (symbolic dimensions come back as -1).
    fn declared_input_dims(&self) -> Result<(String, Vec<i64>)> {
        let input = self
            .session
            .inputs()
            .first()
            .ok_or_else(|| MatteError::metadata("Model declares no inputs"))?;
        match input.dtype() {
            ValueType::Tensor { shape, .. } => Ok((input.name().to_string(), shape.to_vec())),
            other => Err(MatteError::metadata(format!(
                "Primary input '{}' is not a tensor: {other:?}",
                input.name()
            ))),
        }
    }
}

impl InferenceSession for OnnxSession {
    fn input_metadata(&self) -> Result<InputMetadata> {
        let (name, dims) = self.declared_input_dims()?;
        let (height, width) = inference::validate_input_shape(&dims)?;
        Ok(InputMetadata {
            name,
            height,
            width,
        })
    }

    fn output_name(&self) -> Result<String> {
        self.session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| MatteError::metadata("Model declares no outputs"))
    }

    fn run(&mut self, input_name: &str, tensor: &Array4<f32>) -> Result<RawOutput> {
        let input_value = Value::from_array(tensor.clone())
            .map_err(|e| MatteError::processing(format!("Failed to convert input tensor: {e}")))?;

        let output_name = self.output_name()?;
        let outputs = self
            .session
            .run(ort::inputs![input_name => input_value])
            .map_err(|e| MatteError::inference(format!("ONNX inference failed: {e}")))?;

        let output_value = outputs
            .get(output_name.as_str())
            .ok_or_else(|| {
                MatteError::inference(format!("Output '{output_name}' missing from results"))
            })?
            .try_extract_array::<f32>()
            .map_err(|e| {
                MatteError::inference(format!("Failed to extract output tensor: {e}"))
            })?;

        let dims = output_value.shape().to_vec();
        let data = output_value.view().iter().copied().collect();
        RawOutput::new(dims, data)
    }
}

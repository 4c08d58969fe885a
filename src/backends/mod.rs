//! Inference session implementations
//!
//! - ONNX Runtime session adapter (feature `onnx`, default)
//! - Mock session with canned outputs, for tests and debugging

pub mod mock;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use self::mock::MockSession;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxSession;

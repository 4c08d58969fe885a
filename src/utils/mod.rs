//! Shared utilities for the matting pipeline

pub mod numeric;

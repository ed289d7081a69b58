//! Error types for the filter core.

use thiserror::Error;

/// Capacity violations reported by [`crate::RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingBufferError {
    #[error("insufficient space: requested {requested} samples, {available} free")]
    InsufficientSpace { requested: usize, available: usize },
    #[error("insufficient data: requested {requested} samples, {available} buffered")]
    InsufficientData { requested: usize, available: usize },
}

/// Not enough filtered audio is buffered to serve an output block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested {requested} samples, only {available} buffered")]
pub struct Underrun {
    pub requested: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("buffer must hold at least one frame")]
    EmptyBuffer,
    #[error("VAD threshold must be within [0, 1], got {0}")]
    VadThreshold(f32),
    #[error("scale factor must be finite and positive, got {0}")]
    ScaleFactor(f32),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create denoise engine: {0}")]
    Create(String),
}

/// Construction-time failures of a [`crate::StreamProcessor`].
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

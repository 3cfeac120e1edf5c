//! Error types for pointfield
//!
//! Only construction can fail. Once the buffers exist, a frame is a pure
//! transform and never reports an error.

use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("particle set must contain at least one particle")]
    EmptyParticleSet,

    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },

    #[error("failed to allocate {bytes} bytes for the {what}")]
    Allocation {
        what: &'static str,
        bytes: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("{what} has length {actual}, expected {expected}")]
    BufferMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

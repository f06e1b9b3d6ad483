//! Error types for encore_runtime

use encore_core::StageError;
use thiserror::Error;

/// Errors that can occur in the Encore runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A page outside the managed set was addressed explicitly
    #[error("unmanaged page: {0}")]
    UnmanagedPage(String),

    /// The stage rejected a mutation
    #[error("stage error: {0}")]
    Stage(String),

    /// The coordinator was dropped while a handle was still live
    #[error("coordinator is gone: {0}")]
    CoordinatorGone(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<StageError> for RuntimeError {
    fn from(err: StageError) -> Self {
        RuntimeError::Stage(err.to_string())
    }
}

impl From<anyhow::Error> for RuntimeError {
    fn from(err: anyhow::Error) -> Self {
        RuntimeError::Other(err.to_string())
    }
}

/// Result type for encore_runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

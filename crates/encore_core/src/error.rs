//! Error types for the stage boundary

use thiserror::Error;

/// Errors a stage backend can report while mutating host elements
#[derive(Error, Debug)]
pub enum StageError {
    /// The element handle no longer refers to a live host element
    #[error("stale element handle: {0}")]
    StaleElement(String),

    /// The backend rejected or failed a mutation
    #[error("stage mutation failed: {0}")]
    Mutation(String),

    /// Gallery operation referenced an item the host does not have
    #[error("gallery item out of range: {0}")]
    GalleryRange(String),

    /// Generic backend error
    #[error("{0}")]
    Other(String),
}

/// Result type for stage operations
pub type StageResult<T> = std::result::Result<T, StageError>;

//! Unified error types for the campaign engine.
//!
//! The pipeline distinguishes four failure classes with different handling at
//! the job boundary:
//! - malformed batch shape → logged, job completes as a no-op
//! - referential violations → per-record skip inside an otherwise good batch
//! - store/transaction failures → whole batch aborted, job marked failed
//! - missing entities (campaign, segment) → logged, job completes as a no-op

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the campaign engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Request or payload failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Job payload did not have the expected batch shape.
    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Duplicate key where the conflict policy forbids it.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store rejected or aborted a unit of work.
    #[error("store error: {0}")]
    Store(String),

    /// The job queue refused a submission (closed or unavailable).
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn malformed_batch(msg: impl Into<String>) -> Self {
        Self::MalformedBatch(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn queue_unavailable(msg: impl Into<String>) -> Self {
        Self::QueueUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors that a worker treats as a no-op success rather than a
    /// job failure.
    pub fn is_noop_at_job_boundary(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::MalformedBatch(_) | Self::NotFound { .. }
        )
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::MalformedBatch(_) => 400,
            Self::Serialization(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::QueueUnavailable(_) => 503,
            Self::Store(_) => 500,
            Self::Internal(_) => 500,
        }
    }
}

//! Error types for evaluation and dataset storage.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No overview (final or partial) and no result was ever stored under this id.
    #[error("repository does not contain an evaluation with id: {0}")]
    EvaluationNotFound(String),

    /// Dataset not found.
    #[error("repository does not contain a dataset with id: {0}")]
    DatasetNotFound(String),

    /// Database error from libSQL.
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

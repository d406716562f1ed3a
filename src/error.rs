// Error types for the taxonomy load pipeline

use thiserror::Error;

/// Failure modes of a bulk taxonomy load.
///
/// Every variant is fatal: the pipeline has no retries, and the first error
/// aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A CSV row that cannot be bound to the expected columns
    /// (missing column, non-numeric code, wrong field count).
    #[error("malformed taxonomy row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    /// A child row named a parent natural key that was never registered
    /// at a previous level. Indicates inconsistent source data.
    #[error("unresolved parent reference: {key}")]
    DanglingReference { key: String },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("event payload encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias used throughout the loader.
pub type LoadResult<T> = Result<T, LoadError>;

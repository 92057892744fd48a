use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while enriching a prospect list.
///
/// Identifiers present on only one side of the join are not errors; they are
/// counted in `ReconcileStats`.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Input file not found or unreadable: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Required column '{column}' is missing (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion service timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Completion service rate limited the request: {message}")]
    RateLimited { message: String },

    #[error("Completion service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Completion service returned no text")]
    EmptyCompletion,

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Malformed response row in batch {batch}, line {line}: {reason}")]
    MalformedRow {
        batch: usize,
        line: usize,
        reason: String,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EnrichError>;

impl EnrichError {
    /// True for failures at the completion-service boundary.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            EnrichError::Http(_)
                | EnrichError::Timeout { .. }
                | EnrichError::RateLimited { .. }
                | EnrichError::Api { .. }
                | EnrichError::EmptyCompletion
                | EnrichError::UnsupportedProvider(_)
        )
    }
}

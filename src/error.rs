use thiserror::Error;

/// Thermal scoring error types
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for scoring operations
pub type ScoreResult<T> = Result<T, ScoreError>;

impl ScoreError {
    /// True for errors caused by malformed flight data rather than setup
    pub fn is_invalid_trace(&self) -> bool {
        matches!(self, ScoreError::InvalidTrace(_))
    }
}

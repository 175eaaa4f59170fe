//! Error type for the command line front end.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fitbit error: {0}")]
    Fitbit(#[from] fitbit_client::FitbitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage error: {0}")]
    Usage(String),
}

/// Result type alias for command runners.
pub type AppResult<T> = Result<T, AppError>;

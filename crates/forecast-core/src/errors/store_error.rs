//! Top-level error type for the forecast store.

use super::error_code::{self, StoreErrorCode};
use super::DatabaseError;

/// Every failure a public storage operation can return.
///
/// `Connectivity` carries the raw engine error untouched: the store was never
/// reached, so there is no statement to wrap. Everything the engine rejects
/// after that point arrives as `Database`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("validation failed: {0}")]
    Validation(String),

    /// Fixed text. The rejected value is never part of it.
    #[error("Invalid metric_name: not a supported metric")]
    InvalidMetric,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Connectivity(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for failures the caller fixes by correcting its input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidMetric)
    }

    /// The wrapped envelope, if the store rejected the operation.
    pub fn as_database_error(&self) -> Option<&DatabaseError> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl StoreErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Validation(_) => error_code::VALIDATION_FAILED,
            Self::InvalidMetric => error_code::INVALID_METRIC,
            Self::Database(e) => e.error_code(),
            Self::Connectivity(_) => error_code::CONNECTIVITY_FAILURE,
            Self::Io(_) => error_code::IO_ERROR,
            Self::Config(_) => error_code::CONFIG_ERROR,
        }
    }
}

/// Convenience type alias.
pub type StoreResult<T> = Result<T, StoreError>;

//! The database error envelope.
//!
//! Every engine failure raised inside the access layer is re-raised as a
//! [`DatabaseError`]. The envelope keeps the statement, its bound parameters
//! and the engine error for internal handlers, but its `Display` and `Debug`
//! output carry the message only. Parameters may hold untrusted input or
//! secrets and must never reach a log line or a response body.

use std::fmt;

use rusqlite::types::Value;
use rusqlite::ErrorCode;

use super::error_code::{self, StoreErrorCode};

/// Coarse classification of the wrapped engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    /// Foreign key, unique, check or not-null violation.
    ConstraintViolation,
    /// Lock contention that outlived the busy timeout.
    Busy,
    /// Any other engine failure (malformed statement, I/O inside SQLite, ...).
    Storage,
}

impl DatabaseErrorKind {
    fn classify(error: &rusqlite::Error) -> Self {
        match error.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation,
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => Self::Busy,
            _ => Self::Storage,
        }
    }
}

/// Structured storage failure. See the module docs for the rendering rules.
pub struct DatabaseError {
    message: String,
    query: Option<String>,
    params: Option<Vec<Value>>,
    original_error: Option<rusqlite::Error>,
    kind: DatabaseErrorKind,
}

impl DatabaseError {
    /// Envelope with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            query: None,
            params: None,
            original_error: None,
            kind: DatabaseErrorKind::Storage,
        }
    }

    /// Wrap an engine failure raised while running `query` with `params`.
    pub fn from_sqlite(
        message: impl Into<String>,
        query: &str,
        params: Vec<Value>,
        error: rusqlite::Error,
    ) -> Self {
        Self::new(message)
            .with_query(query)
            .with_params(params)
            .with_original_error(error)
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Attach the engine error. Also reclassifies the envelope.
    pub fn with_original_error(mut self, error: rusqlite::Error) -> Self {
        self.kind = DatabaseErrorKind::classify(&error);
        self.original_error = Some(error);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Statement text, for internal diagnostics only.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Bound parameters, for internal diagnostics only.
    pub fn params(&self) -> Option<&[Value]> {
        self.params.as_deref()
    }

    /// The engine error this envelope was raised from.
    pub fn original_error(&self) -> Option<&rusqlite::Error> {
        self.original_error.as_ref()
    }

    pub fn kind(&self) -> DatabaseErrorKind {
        self.kind
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind == DatabaseErrorKind::ConstraintViolation
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseError")
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("has_query", &self.query.is_some())
            .field("param_count", &self.params.as_ref().map(Vec::len))
            .field(
                "sqlite_code",
                &self
                    .original_error
                    .as_ref()
                    .and_then(rusqlite::Error::sqlite_error_code),
            )
            .finish()
    }
}

// The engine error is reachable only through `original_error()`. It is not
// returned from `source()`, so report chains never print it.
impl std::error::Error for DatabaseError {}

impl StoreErrorCode for DatabaseError {
    fn error_code(&self) -> &'static str {
        match self.kind {
            DatabaseErrorKind::ConstraintViolation => error_code::CONSTRAINT_VIOLATION,
            DatabaseErrorKind::Busy => error_code::DB_BUSY,
            DatabaseErrorKind::Storage => error_code::STORAGE_ERROR,
        }
    }
}

//! Stable error codes for callers that map failures onto their own surface
//! (HTTP status, admin reports).

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
pub const INVALID_METRIC: &str = "INVALID_METRIC";
pub const CONSTRAINT_VIOLATION: &str = "CONSTRAINT_VIOLATION";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const CONNECTIVITY_FAILURE: &str = "CONNECTIVITY_FAILURE";
pub const IO_ERROR: &str = "IO_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Implemented by every error type that crosses the crate boundary.
pub trait StoreErrorCode {
    fn error_code(&self) -> &'static str;
}

//! # forecast-storage
//!
//! SQLite persistence for the forecast store.
//! Connection setup with enforced foreign keys, versioned schema, guarded
//! parameterized queries, the retention engine and the predictions ingestion
//! pipeline. Every operation takes an already-open `&Connection`; callers own
//! connection lifetime and concurrency.

pub mod admin;
pub mod artifacts;
pub mod connection;
pub mod ingestion;
pub mod migrations;
pub mod queries;
pub mod retention;
pub mod schema;

pub use connection::{with_transaction, ConnectionManager, ConnectionProvider};
pub use ingestion::{save_predictions_to_db, save_predictions_with};
pub use retention::RetentionEngine;

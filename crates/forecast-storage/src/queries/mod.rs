//! Parameterized query modules, one per table family.
//!
//! Every statement goes through [`exec`], which turns engine failures into the
//! [`forecast_core::DatabaseError`] envelope. Statement text is always a
//! compile-time constant or assembled from `&'static str` pieces only.

pub mod configs;
pub mod exec;
pub mod historical;
pub mod jobs;
pub mod models;
pub mod predictions;
pub mod training;

pub use exec::{execute, query_optional, query_rows};

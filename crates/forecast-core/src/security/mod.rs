//! Input guards at the boundary between caller-supplied values and storage.
//!
//! - **path_safety**: models-root containment check run before every file deletion
//! - **metric_whitelist**: closed set of metric identifiers allowed into SQL text

pub mod metric_whitelist;
pub mod path_safety;

pub use metric_whitelist::{validate_metric_name, Metric};
pub use path_safety::{is_path_safe, resolve_within};

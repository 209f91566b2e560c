pub mod database_error;
pub mod error_code;
mod recovery;
mod store_error;

pub use database_error::{DatabaseError, DatabaseErrorKind};
pub use recovery::RecoveryAction;
pub use store_error::{StoreError, StoreResult};

//! Connection acquisition, per-connection PRAGMAs and transaction scope.

pub mod manager;
pub mod pragmas;
pub mod transaction;

pub use manager::{ConnectionManager, ConnectionProvider};
pub use pragmas::{configure_connection, foreign_keys_enabled};
pub use transaction::with_transaction;

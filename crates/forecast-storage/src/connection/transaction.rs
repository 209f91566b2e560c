//! Scoped transactions over a borrowed connection.

use rusqlite::Connection;
use tracing::warn;

use forecast_core::{DatabaseError, StoreResult};

const SAVEPOINT: &str = "forecast_tx";

/// Run `f` atomically: commit if it returns `Ok`, roll back if it returns `Err`.
///
/// On an autocommit connection this opens `BEGIN IMMEDIATE`, so the write lock
/// is taken up front. If the caller already holds a transaction the scope
/// becomes a savepoint inside it and the caller's commit decides durability.
pub fn with_transaction<T, F>(conn: &Connection, f: F) -> StoreResult<T>
where
    F: FnOnce(&Connection) -> StoreResult<T>,
{
    let nested = !conn.is_autocommit();
    let (begin, commit, rollback) = if nested {
        (
            format!("SAVEPOINT {SAVEPOINT}"),
            format!("RELEASE SAVEPOINT {SAVEPOINT}"),
            format!("ROLLBACK TO SAVEPOINT {SAVEPOINT}; RELEASE SAVEPOINT {SAVEPOINT}"),
        )
    } else {
        (
            "BEGIN IMMEDIATE".to_string(),
            "COMMIT".to_string(),
            "ROLLBACK".to_string(),
        )
    };

    conn.execute_batch(&begin)
        .map_err(|e| DatabaseError::new("Failed to begin transaction").with_original_error(e))?;

    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch(&commit) {
                roll_back(conn, &rollback);
                return Err(
                    DatabaseError::new("Failed to commit transaction")
                        .with_original_error(e)
                        .into(),
                );
            }
            Ok(value)
        }
        Err(err) => {
            roll_back(conn, &rollback);
            Err(err)
        }
    }
}

fn roll_back(conn: &Connection, rollback: &str) {
    if let Err(e) = conn.execute_batch(rollback) {
        warn!(code = ?e.sqlite_error_code(), "Rollback failed");
    }
}

//! SQLite PRAGMA configuration.
//!
//! Must be called on every connection immediately after opening. Foreign key
//! enforcement is per-connection in SQLite and off by default, so a connection
//! that skipped this step would silently accept orphan rows.

use rusqlite::Connection;

use forecast_core::{DatabaseError, StoreResult};

/// Apply production PRAGMAs and verify foreign keys are enforced.
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u32) -> StoreResult<()> {
    let batch = format!(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        "
    );
    conn.execute_batch(&batch).map_err(|e| {
        DatabaseError::new("Failed to configure database connection").with_original_error(e)
    })?;

    if !foreign_keys_enabled(conn)? {
        // PRAGMA foreign_keys is a no-op inside an open transaction.
        return Err(DatabaseError::new("Foreign key enforcement could not be enabled").into());
    }
    Ok(())
}

/// Read back `PRAGMA foreign_keys`.
pub fn foreign_keys_enabled(conn: &Connection) -> StoreResult<bool> {
    let flag: i64 = conn
        .pragma_query_value(None, "foreign_keys", |row| row.get(0))
        .map_err(|e| {
            DatabaseError::new("Failed to read foreign key setting").with_original_error(e)
        })?;
    Ok(flag == 1)
}

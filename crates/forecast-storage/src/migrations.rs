//! Migration runner: version tracking, forward-only, one transaction per migration.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use forecast_core::{DatabaseError, StoreResult};

use crate::schema::SCHEMA_V1;

/// Highest schema version this build knows.
pub const LATEST_VERSION: u32 = 1;

type MigrationFn = fn(&Connection) -> rusqlite::Result<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 1] = [(1, "initial_schema", initial_schema)];

fn initial_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_V1)
}

fn migration_err(message: &str, e: rusqlite::Error) -> DatabaseError {
    DatabaseError::new(message).with_original_error(e)
}

/// Current schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    let exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| migration_err("Failed to read schema version", e))?;
    if !exists {
        return Ok(0);
    }

    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| migration_err("Failed to read schema version", e))?;
    Ok(version)
}

/// Apply every pending migration. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> StoreResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );",
    )
    .map_err(|e| migration_err("Failed to create schema_version table", e))?;

    let current = current_version(conn)?;
    if current >= LATEST_VERSION {
        debug!(version = current, "Schema is up to date");
        return Ok(0);
    }
    info!(from = current, to = LATEST_VERSION, "Running migrations");

    let mut applied = 0;
    for &(version, name, migrate) in &MIGRATIONS {
        if version <= current {
            continue;
        }

        apply_migration(conn, version, name, migrate)?;
        applied += 1;
    }

    Ok(applied)
}

fn apply_migration(conn: &Connection, version: u32, name: &str, migrate: MigrationFn) -> StoreResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| migration_err("Failed to begin migration", e))?;

    let result = migrate(conn).and_then(|()| {
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
            .map(|_| ())
    });

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")
                .map_err(|e| migration_err("Failed to commit migration", e))?;
            info!(version, name, "Applied migration");
            Ok(())
        }
        Err(e) => {
            warn!(version, name, "Migration failed, rolling back");
            if let Err(rb) = conn.execute_batch("ROLLBACK") {
                warn!(version, code = ?rb.sqlite_error_code(), "Rollback failed");
            }
            Err(migration_err("Schema migration failed", e).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);
    }

    #[test]
    fn migrations_apply_once() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 1);
        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
        assert_eq!(run_migrations(&conn).unwrap(), 0);
    }

    fn half_applied(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch("CREATE TABLE partial (id INTEGER PRIMARY KEY);")?;
        conn.execute_batch("CREATE TABLE partial (id INTEGER PRIMARY KEY);")
    }

    fn ends_transaction(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch("COMMIT; CREATE TABLE stray (id INTEGER);")?;
        Err(rusqlite::Error::InvalidQuery)
    }

    #[test]
    fn failed_migration_rolls_back_its_statements() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let err = apply_migration(&conn, 2, "half_applied", half_applied).unwrap_err();
        assert!(err.as_database_error().is_some());
        assert!(conn.is_autocommit());
        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
        let partial: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 'partial'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(partial, 0);
    }

    #[test]
    fn failed_rollback_still_reports_migration_error() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        // The migration closed the transaction itself, so ROLLBACK fails and is logged.
        let err = apply_migration(&conn, 2, "ends_transaction", ends_transaction).unwrap_err();
        assert!(err.as_database_error().is_some());
        assert!(conn.is_autocommit());
        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
    }
}

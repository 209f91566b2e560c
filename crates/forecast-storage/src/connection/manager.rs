//! Connection acquisition.
//!
//! Opening the store is the one place where a raw engine error escapes
//! unwrapped (`StoreError::Connectivity`): nothing was executed yet, so there
//! is no statement to put in an envelope. Setup failures after the handle is
//! open (PRAGMAs, migrations) arrive as `StoreError::Database`.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use forecast_core::{StorageConfig, StoreError, StoreResult};

use super::pragmas::configure_connection;
use crate::migrations::run_migrations;

/// Something that can hand out a configured connection.
///
/// Operations that run in the background (or that must report "store
/// unreachable" separately from "store rejected the operation") take a
/// provider instead of an open connection.
pub trait ConnectionProvider {
    fn acquire(&self) -> StoreResult<Connection>;
}

impl<F> ConnectionProvider for F
where
    F: Fn() -> StoreResult<Connection>,
{
    fn acquire(&self) -> StoreResult<Connection> {
        self()
    }
}

/// Opens configured, migrated connections from a [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    config: StorageConfig,
}

impl ConnectionManager {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Open a connection: file-backed if `database_path` is set, in-memory otherwise.
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = match &self.config.database_path {
            Some(path) => self.open_file(path)?,
            None => Connection::open_in_memory().map_err(StoreError::Connectivity)?,
        };
        configure_connection(&conn, self.config.busy_timeout_ms)?;
        let applied = run_migrations(&conn)?;
        debug!(migrations_applied = applied, "Connection ready");
        Ok(conn)
    }

    /// In-memory connection with the full schema, for tests and scratch work.
    pub fn open_in_memory() -> StoreResult<Connection> {
        Self::new(StorageConfig::default()).connect()
    }

    fn open_file(&self, path: &Path) -> StoreResult<Connection> {
        let existed = path.exists();
        let conn = Connection::open(path).map_err(StoreError::Connectivity)?;
        if self.config.restrict_file_permissions {
            restrict_permissions(path)?;
        }
        if !existed {
            info!("Created database file");
        }
        Ok(conn)
    }
}

impl ConnectionProvider for ConnectionManager {
    fn acquire(&self) -> StoreResult<Connection> {
        self.connect()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> StoreResult<()> {
    Ok(())
}

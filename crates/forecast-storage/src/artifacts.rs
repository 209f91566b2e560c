//! Model artifact files on disk.
//!
//! Every removal resolves the path against the models root first and deletes
//! the resolved path, never the raw stored text. A file outside the root is
//! never touched, whatever the database says.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use forecast_core::{resolve_within, StoreResult};

use crate::queries::exec::query_rows;

/// Remove the artifact file of each `(model_id, model_path)` pair.
/// Returns how many files were deleted.
pub fn remove_artifacts(models_root: &Path, removed: &[(String, String)]) -> u64 {
    let mut deleted = 0u64;
    for (model_id, model_path) in removed {
        let Some(resolved) = resolve_within(models_root, model_path) else {
            warn!(model_id = %model_id, "Artifact path outside models root, file kept");
            continue;
        };
        match std::fs::remove_file(&resolved) {
            Ok(()) => deleted += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(model_id = %model_id, "Artifact already gone");
            }
            Err(e) => {
                warn!(model_id = %model_id, kind = ?e.kind(), "Failed to delete artifact");
            }
        }
    }
    deleted
}

/// [`remove_artifacts`], but only once the row deletions are durable.
///
/// When the caller still holds an open transaction the rows may yet roll back,
/// so files are left in place for [`sweep_orphaned_artifacts`] to collect.
pub fn remove_artifacts_after_commit(
    conn: &Connection,
    models_root: &Path,
    removed: &[(String, String)],
) -> u64 {
    if removed.is_empty() {
        return 0;
    }
    if !conn.is_autocommit() {
        warn!(
            pending = removed.len(),
            "Caller transaction still open, artifact files deferred to orphan sweep"
        );
        return 0;
    }
    remove_artifacts(models_root, removed)
}

/// Delete files under `models_root` that no model row references and that
/// have not been modified for at least `grace`. Returns how many were deleted.
pub fn sweep_orphaned_artifacts(conn: &Connection, models_root: &Path, grace: Duration) -> StoreResult<u64> {
    let referenced: HashSet<PathBuf> = query_rows(conn, "SELECT model_path FROM models", &[], |row| {
        row.get::<_, String>(0)
    })?
    .into_iter()
    .map(|p| resolve(Path::new(&p)))
    .collect();

    let protected = database_files(conn);
    let now = SystemTime::now();
    let mut deleted = 0u64;
    let mut pending = vec![models_root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = std::fs::symlink_metadata(&path) else {
                continue;
            };
            if metadata.is_dir() {
                pending.push(path);
                continue;
            }
            if !metadata.is_file() {
                continue;
            }

            let resolved = resolve(&path);
            if referenced.contains(&resolved) || protected.contains(&resolved) {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < grace {
                continue;
            }
            let Some(target) = resolve_within(models_root, &path) else {
                continue;
            };

            match std::fs::remove_file(&target) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(kind = ?e.kind(), "Failed to delete orphaned artifact"),
            }
        }
    }

    if deleted > 0 {
        info!(deleted, "Swept orphaned model artifacts");
    }
    Ok(deleted)
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The database file and its WAL companions, which may live under the models root.
fn database_files(conn: &Connection) -> HashSet<PathBuf> {
    let Some(db) = conn.path().filter(|p| !p.is_empty()) else {
        return HashSet::new();
    };
    ["", "-wal", "-shm", "-journal"]
        .iter()
        .map(|suffix| resolve(Path::new(&format!("{db}{suffix}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_paths_are_never_removed() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let victim = outside.path().join("keep.bin");
        std::fs::write(&victim, b"x").unwrap();
        let inside = root.path().join("m1.bin");
        std::fs::write(&inside, b"x").unwrap();

        let removed = vec![
            ("m1".to_string(), inside.display().to_string()),
            ("m2".to_string(), victim.display().to_string()),
        ];
        assert_eq!(remove_artifacts(root.path(), &removed), 1);
        assert!(!inside.exists());
        assert!(victim.exists());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let root = tempfile::tempdir().unwrap();
        let ghost = root.path().join("ghost.bin").display().to_string();
        assert_eq!(remove_artifacts(root.path(), &[("m".to_string(), ghost)]), 0);
    }

    #[test]
    fn deferred_inside_open_transaction() {
        let conn = Connection::open_in_memory().unwrap();
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("m1.bin");
        std::fs::write(&file, b"x").unwrap();

        conn.execute_batch("BEGIN").unwrap();
        let removed = vec![("m1".to_string(), file.display().to_string())];
        assert_eq!(remove_artifacts_after_commit(&conn, root.path(), &removed), 0);
        assert!(file.exists());
    }
}

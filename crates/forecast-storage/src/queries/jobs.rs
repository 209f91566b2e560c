//! Jobs and their status history.

use rusqlite::types::{Type, Value};
use rusqlite::{Connection, Row};

use forecast_core::models::timestamps::now_timestamp;
use forecast_core::{JobRecord, JobStatus, JobStatusEntry, StoreResult};

use super::exec::{execute, json_text, opt_json_column, opt_text, query_optional, query_rows, real, text};
use crate::connection::with_transaction;

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<JobStatus> {
    let raw: String = row.get(idx)?;
    JobStatus::parse(&raw)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(idx, "status".to_string(), Type::Text))
}

/// Insert a new job in `pending` state.
pub fn create_job(
    conn: &Connection,
    job_id: &str,
    job_type: &str,
    parameters: Option<&serde_json::Value>,
) -> StoreResult<()> {
    let now = now_timestamp();
    execute(
        conn,
        "INSERT INTO jobs (job_id, job_type, status, created_at, updated_at, parameters, progress)
         VALUES (?1, ?2, 'pending', ?3, ?3, ?4, 0)",
        &[
            text(job_id),
            text(job_type),
            text(now),
            parameters.map_or(Value::Null, json_text),
        ],
    )?;
    Ok(())
}

/// Append a status history entry. Fails with a constraint violation if the job does not exist.
pub fn add_job_status_history(
    conn: &Connection,
    job_id: &str,
    status: JobStatus,
    progress: f64,
    status_message: Option<&str>,
) -> StoreResult<()> {
    execute(
        conn,
        "INSERT INTO job_status_history (job_id, status, progress, status_message, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        &[
            text(job_id),
            text(status.as_str()),
            real(progress),
            opt_text(status_message),
            text(now_timestamp()),
        ],
    )?;
    Ok(())
}

/// Update a job's status and progress and record the transition in its history.
///
/// Both writes share one transaction. An unknown job fails on the history
/// insert and leaves nothing behind.
pub fn update_job_status(
    conn: &Connection,
    job_id: &str,
    status: JobStatus,
    progress: Option<f64>,
    status_message: Option<&str>,
    error_message: Option<&str>,
) -> StoreResult<()> {
    with_transaction(conn, |conn| {
        let now = now_timestamp();
        execute(
            conn,
            "UPDATE jobs
             SET status = ?2,
                 progress = COALESCE(?3, progress),
                 error_message = COALESCE(?4, error_message),
                 updated_at = ?5
             WHERE job_id = ?1",
            &[
                text(job_id),
                text(status.as_str()),
                progress.map_or(Value::Null, real),
                opt_text(error_message),
                text(now),
            ],
        )?;

        let recorded: f64 = query_optional(
            conn,
            "SELECT progress FROM jobs WHERE job_id = ?1",
            &[text(job_id)],
            |row| row.get(0),
        )?
        .unwrap_or(progress.unwrap_or(0.0));

        add_job_status_history(conn, job_id, status, recorded, status_message)
    })
}

pub fn get_job(conn: &Connection, job_id: &str) -> StoreResult<Option<JobRecord>> {
    query_optional(
        conn,
        "SELECT job_id, job_type, status, created_at, updated_at, parameters, progress, error_message
         FROM jobs WHERE job_id = ?1",
        &[text(job_id)],
        |row| {
            Ok(JobRecord {
                job_id: row.get(0)?,
                job_type: row.get(1)?,
                status: status_column(row, 2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
                parameters: opt_json_column(row, 5)?,
                progress: row.get(6)?,
                error_message: row.get(7)?,
            })
        },
    )
}

/// History entries for a job, oldest first.
pub fn get_job_status_history(conn: &Connection, job_id: &str) -> StoreResult<Vec<JobStatusEntry>> {
    query_rows(
        conn,
        "SELECT job_id, status, progress, status_message, updated_at
         FROM job_status_history WHERE job_id = ?1 ORDER BY id",
        &[text(job_id)],
        |row| {
            Ok(JobStatusEntry {
                job_id: row.get(0)?,
                status: status_column(row, 1)?,
                progress: row.get(2)?,
                status_message: row.get(3)?,
                updated_at: row.get(4)?,
            })
        },
    )
}

//! Guarded statement execution.

use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};

use forecast_core::{DatabaseError, StoreError, StoreResult};

fn wrap(sql: &str, params: &[Value], error: rusqlite::Error) -> StoreError {
    let message = if error.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
        "Database constraint violation"
    } else {
        "Database operation failed"
    };
    DatabaseError::from_sqlite(message, sql, params.to_vec(), error).into()
}

/// Run a write statement. Returns the number of affected rows.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> StoreResult<usize> {
    let mut stmt = conn.prepare_cached(sql).map_err(|e| wrap(sql, params, e))?;
    stmt.execute(params_from_iter(params.iter()))
        .map_err(|e| wrap(sql, params, e))
}

/// Run a read statement and map every row.
pub fn query_rows<T, F>(conn: &Connection, sql: &str, params: &[Value], map: F) -> StoreResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql).map_err(|e| wrap(sql, params, e))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map)
        .map_err(|e| wrap(sql, params, e))?;
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(|e| wrap(sql, params, e))
}

/// Run a read statement expected to match at most one row.
pub fn query_optional<T, F>(
    conn: &Connection,
    sql: &str,
    params: &[Value],
    map: F,
) -> StoreResult<Option<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    Ok(query_rows(conn, sql, params, map)?.into_iter().next())
}

pub fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

pub fn opt_text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, |s| Value::Text(s.to_string()))
}

pub fn real(v: f64) -> Value {
    Value::Real(v)
}

pub fn json_text(v: &serde_json::Value) -> Value {
    Value::Text(v.to_string())
}

/// Read a JSON text column.
pub fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<serde_json::Value> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a nullable JSON text column.
pub fn opt_json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

//! Date-keyed historical fact tables.

use rusqlite::types::Value;
use rusqlite::Connection;

use forecast_core::StoreResult;

use super::exec::{execute, real, text};

/// One of the four historical fact families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoricalFamily {
    Sales,
    Stock,
    StockChanges,
    Prices,
}

impl HistoricalFamily {
    pub const ALL: [HistoricalFamily; 4] = [Self::Sales, Self::Stock, Self::StockChanges, Self::Prices];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Sales => "fact_sales",
            Self::Stock => "fact_stock",
            Self::StockChanges => "fact_stock_changes",
            Self::Prices => "fact_prices",
        }
    }
}

/// Insert one fact. `data_date` is `YYYY-MM-DD`.
pub fn insert_fact(
    conn: &Connection,
    family: HistoricalFamily,
    multiindex_id: i64,
    data_date: &str,
    value: f64,
) -> StoreResult<()> {
    let sql = format!(
        "INSERT INTO {} (multiindex_id, data_date, value) VALUES (?1, ?2, ?3)",
        family.table()
    );
    execute(
        conn,
        &sql,
        &[Value::Integer(multiindex_id), text(data_date), real(value)],
    )?;
    Ok(())
}

/// Delete facts dated strictly before `cutoff_date`. Returns the number removed.
pub fn delete_facts_before(
    conn: &Connection,
    family: HistoricalFamily,
    cutoff_date: &str,
) -> StoreResult<u64> {
    let sql = format!("DELETE FROM {} WHERE data_date < ?1", family.table());
    let removed = execute(conn, &sql, &[text(cutoff_date)])?;
    Ok(removed as u64)
}

pub fn count_facts(conn: &Connection, family: HistoricalFamily) -> StoreResult<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", family.table());
    let n = super::exec::query_optional(conn, &sql, &[], |row| row.get::<_, i64>(0))?.unwrap_or(0);
    Ok(u64::try_from(n).unwrap_or(0))
}

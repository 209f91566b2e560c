//! Tabular predictions input.
//!
//! Expected header: the ten entity columns, the five quantile columns, and
//! optionally `point` and `prediction_month`. Error messages name rows and
//! columns only, never cell contents.

use std::io::Read;

use chrono::NaiveDate;

use forecast_core::models::timestamps::month_start;
use forecast_core::{
    PredictionRow, StoreError, StoreResult, MULTIINDEX_COLUMNS, POINT_COLUMN,
    PREDICTION_MONTH_COLUMN, QUANTILE_COLUMNS,
};

/// Column positions resolved from the header row.
struct Layout {
    entity: Vec<usize>,
    quantiles: Vec<usize>,
    point: Option<usize>,
    month: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> StoreResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = QUANTILE_COLUMNS
            .iter()
            .map(|(label, _)| *label)
            .chain(MULTIINDEX_COLUMNS)
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            entity: MULTIINDEX_COLUMNS.iter().filter_map(|c| find(*c)).collect(),
            quantiles: QUANTILE_COLUMNS.iter().filter_map(|(c, _)| find(*c)).collect(),
            point: find(POINT_COLUMN),
            month: find(PREDICTION_MONTH_COLUMN),
        })
    }
}

fn invalid_csv() -> StoreError {
    StoreError::Validation("This is not a valid CSV file".to_string())
}

fn parse_number(record: &csv::StringRecord, idx: usize, row: usize, column: &str) -> StoreResult<f64> {
    record
        .get(idx)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| StoreError::Validation(format!("row {row}: column {column} is not a number")))
}

fn parse_month(raw: &str, row: usize) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .map(month_start)
        .map_err(|_| {
            StoreError::Validation(format!(
                "row {row}: column {PREDICTION_MONTH_COLUMN} is not a date"
            ))
        })
}

/// Parse every row. Rows without a month column land in `default_month`.
pub fn parse_predictions<R: Read>(reader: R, default_month: NaiveDate) -> StoreResult<Vec<PredictionRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|_| invalid_csv())?.clone();
    let layout = Layout::from_headers(&headers)?;
    let default_month = month_start(default_month);

    let mut rows = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|_| invalid_csv())?;

        let mut quantiles = [0.0; 5];
        for (slot, (&idx, (label, _))) in layout.quantiles.iter().zip(QUANTILE_COLUMNS).enumerate() {
            quantiles[slot] = parse_number(&record, idx, row, label)?;
        }

        let point_forecast = match layout.point {
            Some(idx) if record.get(idx).is_some_and(|v| !v.is_empty()) => {
                parse_number(&record, idx, row, POINT_COLUMN)?
            }
            _ => quantiles[2],
        };

        let month = match layout.month {
            Some(idx) if record.get(idx).is_some_and(|v| !v.is_empty()) => {
                parse_month(record.get(idx).unwrap_or_default(), row)?
            }
            _ => default_month,
        };

        let entity = layout
            .entity
            .iter()
            .map(|&idx| record.get(idx).unwrap_or_default().to_string())
            .collect();

        rows.push(PredictionRow {
            entity,
            prediction_month: month.format("%Y-%m-%d").to_string(),
            point_forecast,
            quantiles,
        });
    }

    if rows.is_empty() {
        return Err(StoreError::Validation("file contains no prediction rows".to_string()));
    }
    Ok(rows)
}

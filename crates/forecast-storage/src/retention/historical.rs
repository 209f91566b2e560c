use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use forecast_core::models::timestamps::cutoff_date;
use forecast_core::{HistoricalCleanup, StoreResult};

use super::{days_or_default, RetentionEngine};
use crate::connection::with_transaction;
use crate::queries::historical::{delete_facts_before, HistoricalFamily};

impl RetentionEngine {
    /// Age out the historical fact tables. Sales and prices follow the sales
    /// cutoff; stock and stock changes follow the stock cutoff.
    pub fn cleanup_historical_data(
        &self,
        conn: &Connection,
        sales_days_to_keep: Option<u32>,
        stock_days_to_keep: Option<u32>,
    ) -> StoreResult<HistoricalCleanup> {
        let sales_days = days_or_default(sales_days_to_keep, self.config.sales_days, "sales_days_to_keep")?;
        let stock_days = days_or_default(stock_days_to_keep, self.config.stock_days, "stock_days_to_keep")?;
        let now = Utc::now();
        let sales_cutoff = cutoff_date(now, sales_days);
        let stock_cutoff = cutoff_date(now, stock_days);

        let removed = with_transaction(conn, |conn| {
            Ok(HistoricalCleanup {
                sales: delete_facts_before(conn, HistoricalFamily::Sales, &sales_cutoff)?,
                stock: delete_facts_before(conn, HistoricalFamily::Stock, &stock_cutoff)?,
                stock_changes: delete_facts_before(conn, HistoricalFamily::StockChanges, &stock_cutoff)?,
                prices: delete_facts_before(conn, HistoricalFamily::Prices, &sales_cutoff)?,
            })
        })?;

        info!(
            sales = removed.sales,
            stock = removed.stock,
            stock_changes = removed.stock_changes,
            prices = removed.prices,
            sales_days_kept = sales_days,
            stock_days_kept = stock_days,
            "Cleaned up historical data"
        );
        Ok(removed)
    }
}

//! Retention reports.

use serde::{Deserialize, Serialize};

/// Per-family row counts removed by historical-fact retention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalCleanup {
    pub sales: u64,
    pub stock: u64,
    pub stock_changes: u64,
    pub prices: u64,
}

impl HistoricalCleanup {
    pub fn total(&self) -> u64 {
        self.sales + self.stock + self.stock_changes + self.prices
    }
}

//! Market data access port.

use chrono::NaiveDate;

use crate::domain::error::StockwatchError;
use crate::domain::ohlcv::OhlcvBar;

/// Source of daily bars.
///
/// Implementations return bars in ascending date order, restricted to
/// `start_date..=end_date`. `Sync` lets one port serve a parallel batch.
pub trait DataPort: Sync {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StockwatchError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockwatchError>;
}

//! Data access port trait.

use crate::domain::error::SignalforgeError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Source of daily bars. Implementations must be shareable across the
/// universe runner's worker threads.
pub trait DataPort: Sync {
    /// Bars for `ticker` with `start <= date <= end`, in any order.
    fn fetch_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalforgeError>;

    fn list_tickers(&self) -> Result<Vec<String>, SignalforgeError>;
}

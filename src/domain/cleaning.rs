//! Bar cleaning ahead of the indicator engine.

use crate::domain::ohlcv::OhlcvBar;
use tracing::warn;

/// Drop malformed bars, sort by date and remove duplicate dates.
///
/// A bar is malformed when any price or the volume is non-finite, or the
/// volume is negative. For duplicate dates the last bar in input order wins.
pub fn clean_bars(ticker: &str, bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    let total = bars.len();
    let mut kept: Vec<OhlcvBar> = bars
        .into_iter()
        .filter(OhlcvBar::is_well_formed)
        .collect();
    let malformed = total - kept.len();

    // stable sort keeps input order within a date
    kept.sort_by_key(|b| b.date);

    let mut out: Vec<OhlcvBar> = Vec::with_capacity(kept.len());
    let mut duplicates = 0;
    for bar in kept {
        match out.last_mut() {
            Some(last) if last.date == bar.date => {
                *last = bar;
                duplicates += 1;
            }
            _ => out.push(bar),
        }
    }

    if malformed > 0 || duplicates > 0 {
        warn!(ticker, malformed, duplicates, "dropped bars during cleaning");
    }
    out
}

//! Ticker universe selection.
//!
//! Parses the ticker list from configuration and resolves `all` against the
//! data source.

use crate::domain::error::SignalforgeError;
use crate::ports::data_port::DataPort;
use std::collections::HashSet;

pub const ALL_TICKERS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerSelection {
    All,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("ticker list is empty")]
    Empty,

    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<TickerSelection, UniverseError> {
    if input.trim().is_empty() {
        return Err(UniverseError::Empty);
    }
    if input.trim().eq_ignore_ascii_case(ALL_TICKERS) {
        return Ok(TickerSelection::All);
    }

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(TickerSelection::List(tickers))
}

/// Expand a selection into concrete tickers.
pub fn resolve_universe(
    selection: &TickerSelection,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, SignalforgeError> {
    match selection {
        TickerSelection::List(tickers) => Ok(tickers.clone()),
        TickerSelection::All => {
            let tickers = data_port.list_tickers()?;
            if tickers.is_empty() {
                return Err(SignalforgeError::Data {
                    reason: "data source lists no tickers".into(),
                });
            }
            Ok(tickers)
        }
    }
}

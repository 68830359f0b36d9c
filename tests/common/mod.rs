#![allow(dead_code)]

use chrono::NaiveDate;
use signalforge::domain::error::SignalforgeError;
use signalforge::domain::frame::TimeSeriesFrame;
pub use signalforge::domain::ohlcv::OhlcvBar;
use signalforge::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalforgeError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SignalforgeError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalforgeError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Flat-range bar: high/low one point either side of close.
pub fn make_bar(ticker: &str, day: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        ticker: ticker.to_string(),
        date: day,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
    }
}

/// Consecutive daily bars from 2023-01-01 with the given closes.
pub fn bars_from_closes(ticker: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, start + chrono::Duration::days(i as i64), c))
        .collect()
}

/// Deterministic wavy price path with a drift, long enough for every default window.
pub fn wavy_bars(ticker: &str, n: usize) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 1);
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 8.0 * (t / 9.0).sin() + 3.0 * (t / 2.5).cos() + 0.05 * t;
            OhlcvBar {
                ticker: ticker.to_string(),
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.4 * (t / 3.0).sin(),
                high: close + 1.0 + 0.5 * (t / 4.0).cos().abs(),
                low: close - 1.0 - 0.5 * (t / 5.0).sin().abs(),
                close,
                volume: 10_000.0 + 2_000.0 * (t / 7.0).sin().abs(),
            }
        })
        .collect()
}

pub fn frame_from(ticker: &str, bars: &[OhlcvBar]) -> TimeSeriesFrame {
    TimeSeriesFrame::from_bars(ticker, bars).unwrap()
}

/// Write bars as `<dir>/<TICKER>.csv` in the download layout.
pub fn write_csv(dir: &Path, ticker: &str, bars: &[OhlcvBar]) {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", ticker)), out).unwrap();
}

/// Same NaN-aware equality for two series.
pub fn same_series(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

//! CSV file data adapter.
//!
//! One file per ticker, `<data_dir>/<TICKER>.csv`, with a header row. Columns
//! are located by case-insensitive header name so extra columns (such as
//! `Adj Close`) and any column order are accepted.

use crate::domain::error::SignalforgeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const REQUIRED: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

#[derive(Debug)]
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

/// Header positions of the required columns, in `REQUIRED` order.
fn locate_columns(headers: &csv::StringRecord) -> Result<[usize; 6], SignalforgeError> {
    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| SignalforgeError::MissingInput {
                column: name.to_string(),
            })?;
    }
    Ok(idx)
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_date(raw: &str) -> Result<NaiveDate, SignalforgeError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| SignalforgeError::Data {
        reason: format!("invalid date '{}': {}", raw, e),
    })
}

/// Empty cells become NaN and are dropped later by cleaning.
fn parse_value(raw: &str, column: &str, line: u64) -> Result<f64, SignalforgeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|e| SignalforgeError::Data {
        reason: format!("invalid {} value '{}' on line {}: {}", column, raw, line, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignalforgeError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| SignalforgeError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SignalforgeError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let [date_i, open_i, high_i, low_i, close_i, volume_i] = locate_columns(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SignalforgeError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let field = |i: usize| record.get(i).unwrap_or("");

            let date = parse_date(field(date_i))?;
            if date < start || date > end {
                continue;
            }

            bars.push(OhlcvBar {
                ticker: ticker.to_string(),
                date,
                open: parse_value(field(open_i), "open", line)?,
                high: parse_value(field(high_i), "high", line)?,
                low: parse_value(field(low_i), "low", line)?,
                close: parse_value(field(close_i), "close", line)?,
                volume: parse_value(field(volume_i), "volume", line)?,
            });
        }

        debug!(ticker, path = %path.display(), bars = bars.len(), "read csv");
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalforgeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalforgeError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SignalforgeError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                tickers.push(stem.to_string_lossy().into_owned());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,104.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,109.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,114.0,55000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("MSFT.csv"), "Date,Open,High,Low,Close,Volume\n").unwrap();
        fs::write(path.join("notes.txt"), "not a ticker").unwrap();

        (dir, path)
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("AAPL", jan(15), jan(17)).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].ticker, "AAPL");
        assert_eq!(bars[0].date, jan(15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("AAPL", jan(16), jan(16)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, jan(16));
    }

    #[test]
    fn fetch_bars_any_column_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY.csv"),
            "volume,close,low,high,open,date\n10,4,1,5,2,2024-01-02 00:00:00\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("SPY", jan(1), jan(31)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, jan(2));
        assert_eq!(bars[0].open, 2.0);
        assert_eq!(bars[0].close, 4.0);
        assert_eq!(bars[0].volume, 10.0);
    }

    #[test]
    fn fetch_bars_missing_header() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("SPY.csv"), "Date,Open,High,Low,Close\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("SPY", jan(1), jan(31)).unwrap_err();
        assert!(matches!(err, SignalforgeError::MissingInput { column } if column == "volume"));
    }

    #[test]
    fn fetch_bars_empty_cell_is_nan() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,,100\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("SPY", jan(1), jan(31)).unwrap();
        assert!(bars[0].close.is_nan());
    }

    #[test]
    fn fetch_bars_garbage_value() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,abc,100\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("SPY", jan(1), jan(31)).unwrap_err();
        assert!(matches!(err, SignalforgeError::Data { reason } if reason.contains("close")));
    }

    #[test]
    fn fetch_bars_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_bars("XYZ", jan(1), jan(31));
        assert!(matches!(result, Err(SignalforgeError::Data { .. })));
    }

    #[test]
    fn list_tickers_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.list_tickers().unwrap(), vec!["AAPL", "MSFT"]);
    }
}

//! CSV output adapter: one table per ticker and strategy.
//!
//! Layout: `Date,Ticker,<frame columns>,Buy,Sell,Position`, one row per bar.
//! Undefined values are written as empty cells.

use crate::domain::error::SignalforgeError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::pipeline::TickerRun;
use crate::ports::sink_port::SinkPort;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn path_for(&self, run: &TickerRun) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.csv", run.ticker(), run.strategy))
    }
}

fn csv_error(path: &Path, e: csv::Error) -> SignalforgeError {
    SignalforgeError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() { String::new() } else { v.to_string() }
}

/// Write `frame` (and optional trailing columns) as CSV to `writer`.
pub fn write_frame<W: Write>(
    writer: W,
    frame: &TimeSeriesFrame,
    extra: &[(&str, Vec<String>)],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Date".to_string(), "Ticker".to_string()];
    header.extend(frame.column_names().iter().map(|c| c.to_string()));
    header.extend(extra.iter().map(|(name, _)| name.to_string()));
    wtr.write_record(&header)?;

    for (i, date) in frame.dates().iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string(), frame.ticker().to_string()];
        row.extend(frame.columns().map(|(_, values)| format_value(values[i])));
        row.extend(extra.iter().map(|(_, values)| values[i].clone()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

impl SinkPort for CsvSink {
    fn write(&self, run: &TickerRun) -> Result<(), SignalforgeError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(run);
        let file = fs::File::create(&path)?;

        let flags = |mask: &[bool]| mask.iter().map(|b| b.to_string()).collect::<Vec<_>>();
        let extra = [
            ("Buy", flags(&run.signals.buy)),
            ("Sell", flags(&run.signals.sell)),
            ("Position", run.positions.iter().map(|p| format_value(*p)).collect()),
        ];
        write_frame(file, &run.frame, &extra).map_err(|e| csv_error(&path, e))?;

        info!(
            ticker = run.ticker(),
            path = %path.display(),
            rows = run.frame.len(),
            "wrote results"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::Column;
    use crate::domain::position::PositionMode;
    use crate::domain::strategy::{SignalMasks, StrategyKind};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_run() -> TickerRun {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ];
        let mut columns = BTreeMap::new();
        columns.insert(Column::Close, vec![10.0, 10.5]);
        columns.insert(Column::Sma(2), vec![f64::NAN, 10.25]);
        let frame = TimeSeriesFrame::from_columns("AAPL", dates, columns).unwrap();
        TickerRun {
            strategy: StrategyKind::MacdCross,
            position_mode: PositionMode::StateMachine,
            frame,
            signals: SignalMasks {
                buy: vec![false, true],
                sell: vec![false, false],
            },
            positions: vec![0.0, 1.0],
        }
    }

    #[test]
    fn writes_table() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("nested"));
        let run = sample_run();

        sink.write(&run).unwrap();

        let path = dir.path().join("nested").join("AAPL_macd_cross.csv");
        assert_eq!(sink.path_for(&run), path);
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Ticker,Close,SMA_2,Buy,Sell,Position");
        assert_eq!(lines[1], "2024-01-02,AAPL,10,,false,false,0");
        assert_eq!(lines[2], "2024-01-03,AAPL,10.5,10.25,true,false,1");
    }

    #[test]
    fn write_frame_without_extras() {
        let run = sample_run();
        let mut buf = Vec::new();
        write_frame(&mut buf, &run.frame, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Date,Ticker,Close,SMA_2\n"));
    }
}

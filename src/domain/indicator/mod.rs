//! Technical indicator engine.
//!
//! Each submodule is a pure function over aligned price slices returning a
//! series of the same length, with `f64::NAN` marking undefined bars.
//! [`IndicatorEngine`] runs all of them over a [`TimeSeriesFrame`] using the
//! parameters in an [`IndicatorConfig`].

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod cmf;
pub mod donchian;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod returns;
pub mod roc;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use adx::calculate_adx;
pub use atr::{calculate_atr, true_range};
pub use bollinger::calculate_bollinger;
pub use cci::calculate_cci;
pub use cmf::calculate_cmf;
pub use donchian::calculate_donchian;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use obv::calculate_obv;
pub use returns::calculate_returns;
pub use roc::calculate_roc;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, calculate_williams_r};

use crate::domain::error::SignalforgeError;
use crate::domain::frame::{Column, TimeSeriesFrame};
use tracing::debug;

pub const DEFAULT_WINDOWS: [usize; 6] = [5, 10, 20, 50, 100, 200];

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    /// SMA/EMA windows.
    pub windows: Vec<usize>,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_mult: f64,
    pub atr_window: usize,
    pub adx_window: usize,
    pub cci_window: usize,
    pub roc_period: usize,
    pub stochastic_window: usize,
    pub stochastic_smoothing: usize,
    pub williams_window: usize,
    pub cmf_window: usize,
    pub donchian_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            rsi_window: 14,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_window: 20,
            bollinger_mult: 2.0,
            atr_window: 14,
            adx_window: 14,
            cci_window: 20,
            roc_period: 10,
            stochastic_window: 14,
            stochastic_smoothing: 3,
            williams_window: 14,
            cmf_window: 20,
            donchian_window: 20,
        }
    }
}

impl IndicatorConfig {
    /// Every column [`compute_indicators`] adds under this configuration.
    pub fn output_columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::Return];
        for &w in &self.windows {
            columns.push(Column::Sma(w));
            columns.push(Column::Ema(w));
        }
        columns.extend([
            Column::Rsi,
            Column::MacdLine,
            Column::MacdSignal,
            Column::UpperBand,
            Column::LowerBand,
            Column::Atr,
            Column::Adx,
            Column::Cci,
            Column::Roc(self.roc_period),
            Column::StochK,
            Column::StochD,
            Column::WilliamsR,
            Column::Obv,
            Column::Cmf,
            Column::DonchianHigh,
            Column::DonchianLow,
        ]);
        columns
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn compute(&self, frame: &TimeSeriesFrame) -> Result<TimeSeriesFrame, SignalforgeError> {
        compute_indicators(frame, &self.config)
    }
}

/// Return a copy of `frame` with every indicator column added.
///
/// Fails with `MissingInput` when an OHLCV column is absent and with
/// `EmptySeries` when the frame has no rows. The input frame is not touched.
pub fn compute_indicators(
    frame: &TimeSeriesFrame,
    config: &IndicatorConfig,
) -> Result<TimeSeriesFrame, SignalforgeError> {
    for column in Column::INPUTS {
        if !frame.has_column(column) {
            return Err(SignalforgeError::MissingInput {
                column: column.to_string(),
            });
        }
    }
    if frame.is_empty() {
        return Err(SignalforgeError::EmptySeries {
            ticker: frame.ticker().to_string(),
        });
    }

    let high = frame.require(Column::High)?;
    let low = frame.require(Column::Low)?;
    let close = frame.require(Column::Close)?;
    let volume = frame.require(Column::Volume)?;

    let mut out = frame.clone();

    out.set_column(Column::Return, calculate_returns(close))?;

    for &w in &config.windows {
        out.set_column(Column::Sma(w), calculate_sma(close, w))?;
        out.set_column(Column::Ema(w), calculate_ema(close, w))?;
    }

    out.set_column(Column::Rsi, calculate_rsi(close, config.rsi_window))?;

    let macd = calculate_macd(close, config.macd_fast, config.macd_slow, config.macd_signal);
    out.set_column(Column::MacdLine, macd.line)?;
    out.set_column(Column::MacdSignal, macd.signal)?;

    let bands = calculate_bollinger(close, config.bollinger_window, config.bollinger_mult);
    out.set_column(Column::UpperBand, bands.upper)?;
    out.set_column(Column::LowerBand, bands.lower)?;

    let tr = true_range(high, low, close);
    out.set_column(Column::Atr, calculate_atr(high, low, close, config.atr_window))?;
    out.set_column(Column::Adx, calculate_adx(high, low, &tr, config.adx_window))?;

    out.set_column(Column::Cci, calculate_cci(high, low, close, config.cci_window))?;
    out.set_column(Column::Roc(config.roc_period), calculate_roc(close, config.roc_period))?;

    let stoch = calculate_stochastic(
        high,
        low,
        close,
        config.stochastic_window,
        config.stochastic_smoothing,
    );
    out.set_column(Column::StochK, stoch.k)?;
    out.set_column(Column::StochD, stoch.d)?;
    out.set_column(
        Column::WilliamsR,
        calculate_williams_r(high, low, close, config.williams_window),
    )?;

    out.set_column(Column::Obv, calculate_obv(close, volume))?;
    out.set_column(
        Column::Cmf,
        calculate_cmf(high, low, close, volume, config.cmf_window),
    )?;

    let channel = calculate_donchian(high, low, config.donchian_window);
    out.set_column(Column::DonchianHigh, channel.upper)?;
    out.set_column(Column::DonchianLow, channel.lower)?;

    debug!(
        ticker = frame.ticker(),
        bars = frame.len(),
        columns = out.column_names().len(),
        "indicators computed"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                ticker: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn frame(closes: &[f64]) -> TimeSeriesFrame {
        TimeSeriesFrame::from_bars("TEST", &make_bars(closes)).unwrap()
    }

    #[test]
    fn adds_every_output_column() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let config = IndicatorConfig::default();
        let out = compute_indicators(&frame(&closes), &config).unwrap();

        for column in config.output_columns() {
            let values = out.column(column).unwrap_or_else(|| panic!("missing {}", column));
            assert_eq!(values.len(), 60);
        }
    }

    #[test]
    fn input_frame_untouched() {
        let input = frame(&[1.0, 2.0, 3.0]);
        let before = input.clone();
        let _ = compute_indicators(&input, &IndicatorConfig::default()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn empty_series_error() {
        let err = compute_indicators(&frame(&[]), &IndicatorConfig::default()).unwrap_err();
        assert!(matches!(err, SignalforgeError::EmptySeries { ticker } if ticker == "TEST"));
    }

    #[test]
    fn missing_input_error() {
        let dates = vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()];
        let mut columns = BTreeMap::new();
        for c in [Column::Open, Column::High, Column::Low, Column::Close] {
            columns.insert(c, vec![1.0]);
        }
        let f = TimeSeriesFrame::from_columns("TEST", dates, columns).unwrap();

        let err = compute_indicators(&f, &IndicatorConfig::default()).unwrap_err();
        assert!(matches!(err, SignalforgeError::MissingInput { column } if column == "Volume"));
    }

    #[test]
    fn custom_windows() {
        let config = IndicatorConfig {
            windows: vec![3],
            ..IndicatorConfig::default()
        };
        let out = compute_indicators(&frame(&[1.0, 2.0, 3.0, 4.0]), &config).unwrap();
        assert!(out.has_column(Column::Sma(3)));
        assert!(!out.has_column(Column::Sma(20)));
        assert_eq!(out.column(Column::Sma(3)).unwrap()[3], 3.0);
    }

    #[test]
    fn engine_uses_its_config() {
        let engine = IndicatorEngine::new(IndicatorConfig {
            roc_period: 2,
            ..IndicatorConfig::default()
        });
        let out = engine.compute(&frame(&[100.0, 100.0, 110.0])).unwrap();
        let roc = out.column(Column::Roc(2)).unwrap();
        assert!((roc[2] - 10.0).abs() < 1e-9);
        assert!(!out.has_column(Column::Roc(10)));
    }
}

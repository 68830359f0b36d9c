//! Time series frame: dated rows plus a closed schema of aligned numeric columns.
//!
//! Raw OHLCV values are stored as the input columns ([`Column::INPUTS`]) so a
//! frame built from a tabular source can be checked for missing inputs the
//! same way indicator columns are checked for missing outputs. Undefined
//! values are `f64::NAN`.

use crate::domain::error::SignalforgeError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    Return,
    Sma(usize),
    Ema(usize),
    Rsi,
    MacdLine,
    MacdSignal,
    UpperBand,
    LowerBand,
    Atr,
    Adx,
    Cci,
    Roc(usize),
    StochK,
    StochD,
    WilliamsR,
    Obv,
    Cmf,
    DonchianHigh,
    DonchianLow,
}

impl Column {
    pub const INPUTS: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn is_input(&self) -> bool {
        Self::INPUTS.contains(self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Open => write!(f, "Open"),
            Column::High => write!(f, "High"),
            Column::Low => write!(f, "Low"),
            Column::Close => write!(f, "Close"),
            Column::Volume => write!(f, "Volume"),
            Column::Return => write!(f, "Return"),
            Column::Sma(w) => write!(f, "SMA_{}", w),
            Column::Ema(w) => write!(f, "EMA_{}", w),
            Column::Rsi => write!(f, "RSI"),
            Column::MacdLine => write!(f, "MACD_line"),
            Column::MacdSignal => write!(f, "SIGNAL_line"),
            Column::UpperBand => write!(f, "UPPER_band"),
            Column::LowerBand => write!(f, "LOWER_band"),
            Column::Atr => write!(f, "ATR"),
            Column::Adx => write!(f, "ADX"),
            Column::Cci => write!(f, "CCI"),
            Column::Roc(p) => write!(f, "ROC_{}", p),
            Column::StochK => write!(f, "%K"),
            Column::StochD => write!(f, "%D"),
            Column::WilliamsR => write!(f, "Williams_%R"),
            Column::Obv => write!(f, "OBV"),
            Column::Cmf => write!(f, "CMF"),
            Column::DonchianHigh => write!(f, "Donchian_High"),
            Column::DonchianLow => write!(f, "Donchian_Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    ticker: String,
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Column, Vec<f64>>,
}

impl TimeSeriesFrame {
    pub fn from_bars(ticker: &str, bars: &[OhlcvBar]) -> Result<Self, SignalforgeError> {
        let dates = bars.iter().map(|b| b.date).collect();
        let mut columns = BTreeMap::new();
        columns.insert(Column::Open, bars.iter().map(|b| b.open).collect());
        columns.insert(Column::High, bars.iter().map(|b| b.high).collect());
        columns.insert(Column::Low, bars.iter().map(|b| b.low).collect());
        columns.insert(Column::Close, bars.iter().map(|b| b.close).collect());
        columns.insert(Column::Volume, bars.iter().map(|b| b.volume).collect());
        Self::from_columns(ticker, dates, columns)
    }

    pub fn from_columns(
        ticker: &str,
        dates: Vec<NaiveDate>,
        columns: BTreeMap<Column, Vec<f64>>,
    ) -> Result<Self, SignalforgeError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(SignalforgeError::InvalidFrame {
                reason: format!(
                    "dates must be strictly increasing ({} followed by {})",
                    pair[0], pair[1]
                ),
            });
        }
        for (column, values) in &columns {
            if values.len() != dates.len() {
                return Err(SignalforgeError::InvalidFrame {
                    reason: format!(
                        "column {} has {} values for {} dates",
                        column,
                        values.len(),
                        dates.len()
                    ),
                });
            }
        }
        Ok(Self {
            ticker: ticker.to_string(),
            dates,
            columns,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, column: Column) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    /// Like [`column`](Self::column), failing with `MissingColumn`.
    pub fn require(&self, column: Column) -> Result<&[f64], SignalforgeError> {
        self.column(column)
            .ok_or_else(|| SignalforgeError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Iterate columns in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (Column, &[f64])> {
        self.columns.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    pub fn column_names(&self) -> Vec<Column> {
        self.columns.keys().copied().collect()
    }

    /// Add or replace a column. The length must match the row count.
    pub fn set_column(&mut self, column: Column, values: Vec<f64>) -> Result<(), SignalforgeError> {
        if values.len() != self.len() {
            return Err(SignalforgeError::LengthMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(column, values);
        Ok(())
    }
}

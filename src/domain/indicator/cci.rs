//! CCI (Commodity Channel Index).
//!
//! TP = (H + L + C) / 3
//! CCI = (TP - SMA(TP)) / (0.015 * MD), MD = rolling mean of |TP - SMA(TP)|
//!
//! The mean deviation averages the current-bar deviations, so the first value
//! appears at index 2n-2. Undefined when MD is 0.

use crate::domain::indicator::rolling::rolling_mean;

const LAMBERT: f64 = 0.015;

pub fn typical_price(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| (high[i] + low[i] + close[i]) / 3.0)
        .collect()
}

pub fn calculate_cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    let sma = rolling_mean(&tp, period);
    let deviation: Vec<f64> = tp.iter().zip(&sma).map(|(t, s)| (t - s).abs()).collect();
    let mean_dev = rolling_mean(&deviation, period);

    (0..tp.len())
        .map(|i| {
            if mean_dev[i] == 0.0 {
                f64::NAN
            } else {
                (tp[i] - sma[i]) / (LAMBERT * mean_dev[i])
            }
        })
        .collect()
}

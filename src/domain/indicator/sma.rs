//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::rolling::rolling_mean;

pub fn calculate_sma(close: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(close, period)
}

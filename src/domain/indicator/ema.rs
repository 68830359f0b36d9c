//! Exponential Moving Average.
//!
//! k = 2/(n+1), EMA[0] = C[0], then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every bar is defined.

use crate::domain::indicator::rolling::ewm;

pub fn calculate_ema(close: &[f64], period: usize) -> Vec<f64> {
    ewm(close, period)
}

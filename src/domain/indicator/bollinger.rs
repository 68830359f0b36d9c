//! Bollinger Bands.
//!
//! - Upper: SMA(n) + (multiplier × StdDev(n))
//! - Lower: SMA(n) - (multiplier × StdDev(n))
//!
//! StdDev is the sample standard deviation (divides by N-1).
//! Default parameters: period=20, multiplier=2.0. Warmup: first (period-1) bars.

use crate::domain::indicator::rolling::{rolling_mean, rolling_std};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(close: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = rolling_mean(close, period);
    let stddev = rolling_std(close, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerBands { upper, lower }
}

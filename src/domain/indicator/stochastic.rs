//! Stochastic oscillator and Williams %R.
//!
//! HH = highest high over n, LL = lowest low over n
//! %K = 100 * (C - LL) / (HH - LL), %D = SMA(%K, d)
//! %R = -100 * (HH - C) / (HH - LL)
//!
//! A zero range (HH == LL) is undefined for both.

use crate::domain::indicator::rolling::{rolling_max, rolling_mean, rolling_min};

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> Stochastic {
    let hh = rolling_max(high, k_period);
    let ll = rolling_min(low, k_period);

    let k: Vec<f64> = (0..close.len())
        .map(|i| {
            let range = hh[i] - ll[i];
            if range == 0.0 {
                f64::NAN
            } else {
                100.0 * (close[i] - ll[i]) / range
            }
        })
        .collect();
    let d = rolling_mean(&k, d_period);

    Stochastic { k, d }
}

pub fn calculate_williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);

    (0..close.len())
        .map(|i| {
            let range = hh[i] - ll[i];
            if range == 0.0 {
                f64::NAN
            } else {
                -100.0 * (hh[i] - close[i]) / range
            }
        })
        .collect()
}

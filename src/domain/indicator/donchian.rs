//! Donchian Channel: highest high / lowest low over a trailing window.
//!
//! The window includes the current bar. Warmup: period - 1.

use crate::domain::indicator::rolling::{rolling_max, rolling_min};

#[derive(Debug, Clone, PartialEq)]
pub struct DonchianChannel {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_donchian(high: &[f64], low: &[f64], period: usize) -> DonchianChannel {
    DonchianChannel {
        upper: rolling_max(high, period),
        lower: rolling_min(low, period),
    }
}

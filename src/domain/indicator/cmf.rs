//! CMF (Chaikin Money Flow).
//!
//! MFM = ((C - L) - (H - C)) / (H - L), 0 when H == L
//! CMF = sum(MFM * V, n) / sum(V, n), undefined when the volume sum is 0.

use crate::domain::indicator::rolling::rolling_sum;

pub fn money_flow_multiplier(high: f64, low: f64, close: f64) -> f64 {
    let range = high - low;
    if range == 0.0 {
        0.0
    } else {
        ((close - low) - (high - close)) / range
    }
}

pub fn calculate_cmf(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Vec<f64> {
    let flow: Vec<f64> = (0..close.len())
        .map(|i| money_flow_multiplier(high[i], low[i], close[i]) * volume[i])
        .collect();
    let flow_sum = rolling_sum(&flow, period);
    let volume_sum = rolling_sum(volume, period);

    flow_sum
        .iter()
        .zip(&volume_sum)
        .map(|(&f, &v)| if v == 0.0 { f64::NAN } else { f / v })
        .collect()
}

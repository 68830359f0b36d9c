//! RSI (Relative Strength Index).
//!
//! gain[i] = max(C[i] - C[i-1], 0), loss[i] = max(C[i-1] - C[i], 0), both 0
//! at the first bar. Averages are simple rolling means over n bars:
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! avg_loss == 0 with avg_gain > 0 gives 100; both zero is undefined.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::rolling::rolling_mean;

pub fn calculate_rsi(close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];

    for i in 1..n {
        let change = close[i] - close[i - 1];
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if l == 0.0 {
                if g > 0.0 { 100.0 } else { f64::NAN }
            } else {
                100.0 - (100.0 / (1.0 + g / l))
            }
        })
        .collect()
}

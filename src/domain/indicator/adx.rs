//! ADX (Average Directional Index).
//!
//! Steps:
//! 1. up = H[i] - H[i-1], down = L[i-1] - L[i]
//!    +DM = max(up, 0) if up > down else 0; -DM = max(down, 0) if down > up else 0
//! 2. Sum +DM, -DM and TR over n bars
//! 3. +DI = 100 * sum(+DM) / sum(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), undefined when the DI sum is 0
//! 5. ADX = rolling mean of DX over n bars
//!
//! The first bar has no directional movement, so +DM/-DM start undefined and
//! the first ADX value appears at index 2n-1.

use crate::domain::indicator::rolling::{rolling_mean, rolling_sum};

pub struct DirectionalMovement {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

pub fn directional_movement(high: &[f64], low: &[f64]) -> DirectionalMovement {
    let n = high.len();
    let mut plus = vec![f64::NAN; n];
    let mut minus = vec![f64::NAN; n];

    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus[i] = if up > down { up.max(0.0) } else { 0.0 };
        minus[i] = if down > up { down.max(0.0) } else { 0.0 };
    }

    DirectionalMovement { plus, minus }
}

/// ADX over a precomputed true-range series (see [`super::atr::true_range`]).
pub fn calculate_adx(high: &[f64], low: &[f64], true_range: &[f64], period: usize) -> Vec<f64> {
    let dm = directional_movement(high, low);
    let sum_plus = rolling_sum(&dm.plus, period);
    let sum_minus = rolling_sum(&dm.minus, period);
    let sum_tr = rolling_sum(true_range, period);

    let dx: Vec<f64> = (0..high.len())
        .map(|i| {
            if sum_tr[i] == 0.0 {
                return f64::NAN;
            }
            let plus_di = 100.0 * sum_plus[i] / sum_tr[i];
            let minus_di = 100.0 * sum_minus[i] / sum_tr[i];
            let di_sum = plus_di + minus_di;
            if di_sum == 0.0 {
                f64::NAN
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            }
        })
        .collect();

    rolling_mean(&dx, period)
}

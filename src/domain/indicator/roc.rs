//! ROC (Rate of Change).
//!
//! ROC(n)[i] = 100 * (C[i] / C[i-n] - 1)
//! Warmup: first n bars undefined. A zero reference close is undefined.

pub fn calculate_roc(close: &[f64], period: usize) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            if i < period {
                return f64::NAN;
            }
            let prev = close[i - period];
            if prev == 0.0 {
                f64::NAN
            } else {
                100.0 * (close[i] / prev - 1.0)
            }
        })
        .collect()
}

//! Daily return: C[i] / C[i-1] - 1, with the first bar at 0.
//!
//! A zero previous close is undefined.

pub fn calculate_returns(close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            if i == 0 {
                0.0
            } else if close[i - 1] == 0.0 {
                f64::NAN
            } else {
                close[i] / close[i - 1] - 1.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_first_bar_zero() {
        let r = calculate_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r[0], 0.0);
        assert!((r[1] - 0.1).abs() < 1e-12);
        assert!((r[2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn returns_zero_previous_close() {
        let r = calculate_returns(&[0.0, 1.0]);
        assert!(r[1].is_nan());
    }
}

//! OBV (On-Balance Volume).

/// OBV[0] = 0, then OBV[i] = OBV[i-1] + sign(C[i] - C[i-1]) * V[i].
///
/// sign(0) = 0. No warmup; every bar is defined.
pub fn calculate_obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut values = Vec::with_capacity(close.len());
    let mut obv = 0.0;

    for i in 0..close.len() {
        if i > 0 {
            let change = close[i] - close[i - 1];
            if change > 0.0 {
                obv += volume[i];
            } else if change < 0.0 {
                obv -= volume[i];
            }
        }
        values.push(obv);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_starts_at_zero() {
        let obv = calculate_obv(&[100.0], &[5000.0]);
        assert_eq!(obv, vec![0.0]);
    }

    #[test]
    fn obv_accumulates_signed_volume() {
        let close = [10.0, 11.0, 10.5, 10.5, 12.0];
        let volume = [100.0, 200.0, 150.0, 300.0, 50.0];
        let obv = calculate_obv(&close, &volume);
        assert_eq!(obv, vec![0.0, 200.0, 50.0, 50.0, 100.0]);
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[], &[]).is_empty());
    }
}

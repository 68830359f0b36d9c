//! Trailing-window and exponential primitives shared by the indicators.
//!
//! Windows are trailing and inclusive of the current index. A window is
//! undefined (NaN) until `period` values have accumulated, and whenever any
//! value inside it is NaN.

/// Apply `f` to every full trailing window of `period` values.
pub fn rolling_apply<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(window);
    }
    out
}

pub fn rolling_sum(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| w.iter().sum())
}

pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Sample standard deviation (divides by N-1). Undefined for a 1-wide window.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| {
        if w.len() < 2 {
            return f64::NAN;
        }
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Recursive exponential mean with alpha = 2/(period+1).
///
/// Seeded with the first defined value; never undefined afterwards. A NaN
/// input after the seed carries the previous mean forward.
pub fn ewm(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut state: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        state = match (state, v.is_nan()) {
            (None, true) => None,
            (None, false) => Some(v),
            (Some(prev), true) => Some(prev),
            (Some(prev), false) => Some(alpha * v + (1.0 - alpha) * prev),
        };
        if let Some(s) = state {
            out[i] = s;
        }
    }
    out
}

//! Small statistics helpers for trend and hotspot computations.
//!
//! Degenerate input (too few values, zero spread) yields `None` instead of
//! NaN so callers can map it to a sentinel classification.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squared = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>();
    Some((squared / (values.len() - 1) as f64).sqrt())
}

/// Least-squares slope of `y` against `x`
pub fn regression_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (covariance, variance_x) = points
        .iter()
        .map(|(x, y)| {
            let diff_x = x - mean_x;
            (diff_x * (y - mean_y), diff_x * diff_x)
        })
        .fold((0.0, 0.0), |acc, (cov, var_x)| (acc.0 + cov, acc.1 + var_x));

    if variance_x == 0.0 {
        return None;
    }
    let slope = covariance / variance_x;
    slope.is_finite().then_some(slope)
}

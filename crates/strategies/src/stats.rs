//! Window statistics used by the strategies.
//!
//! All functions return `None` when the input is too short or degenerate,
//! which strategies treat as "no signal this bar".

use statrs::statistics::Statistics;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Least-squares slope of `y` on `x` through the origin.
pub fn ols_slope(y: &[f64], x: &[f64]) -> Option<f64> {
    if y.len() != x.len() || y.is_empty() {
        return None;
    }
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx <= 0.0 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    Some(sxy / sxx)
}

/// Residual spread `y - hedge_ratio * x`.
pub fn spread(y: &[f64], x: &[f64], hedge_ratio: f64) -> Vec<f64> {
    y.iter().zip(x).map(|(a, b)| a - hedge_ratio * b).collect()
}

/// Z-score of the last element against the whole series (sample stdev).
pub fn last_zscore(series: &[f64]) -> Option<f64> {
    let last = *series.last()?;
    if series.len() < 2 {
        return None;
    }
    let mean = series.iter().mean();
    let std = series.iter().std_dev();
    if !std.is_finite() || std <= f64::EPSILON * mean.abs().max(1.0) {
        return None;
    }
    Some((last - mean) / std)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert!(mean(&[]).is_none());
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_ols_slope_exact() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(ols_slope(&y, &x).unwrap(), 2.0);
    }

    #[test]
    fn test_ols_slope_degenerate() {
        assert!(ols_slope(&[1.0, 2.0], &[0.0, 0.0]).is_none());
        assert!(ols_slope(&[1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_last_zscore() {
        // mean = 2.5, sample std = 1.2909944
        let z = last_zscore(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(z, 1.5 / 1.2909944487358056, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_series_has_no_zscore() {
        assert!(last_zscore(&[5.0, 5.0, 5.0]).is_none());
        assert!(last_zscore(&[5.0]).is_none());
    }
}

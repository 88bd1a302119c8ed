//! Descriptive statistics over finite samples
//!
//! Every function ignores NaN and infinite samples. Empty inputs produce
//! zeros rather than NaN so that results stay serializable.

use serde::Serialize;

/// Mean, spread and order statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Number of finite samples
    pub count: usize,
}

/// Collect the finite samples of an iterator
pub fn finite_values(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

/// Arithmetic mean of the finite samples (0 when there are none)
pub fn mean(values: &[f64]) -> f64 {
    let finite = finite_values(values.iter().copied());
    if finite.is_empty() {
        return 0.0;
    }
    finite.iter().sum::<f64>() / finite.len() as f64
}

/// Population standard deviation of the finite samples (0 when there are none)
pub fn std_dev(values: &[f64]) -> f64 {
    let finite = finite_values(values.iter().copied());
    if finite.is_empty() {
        return 0.0;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let var = finite.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / finite.len() as f64;
    var.sqrt()
}

/// Linearly interpolated percentile (0-100) of an ascending-sorted slice.
///
/// Returns 0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Summarize the finite samples of an iterator
pub fn summarize(values: impl IntoIterator<Item = f64>) -> Summary {
    let mut finite = finite_values(values);
    if finite.is_empty() {
        return Summary::default();
    }
    finite.sort_by(|a, b| a.total_cmp(b));

    let n = finite.len();
    let m = finite.iter().sum::<f64>() / n as f64;
    let var = finite.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n as f64;

    Summary {
        mean: m,
        std: var.sqrt(),
        min: finite[0],
        max: finite[n - 1],
        median: percentile(&finite, 50.0),
        count: n,
    }
}

/// Number of finite samples whose |z-score| exceeds `k`.
///
/// A constant sample has no outliers.
pub fn zscore_outliers(values: &[f64], k: f64) -> usize {
    let m = mean(values);
    let s = std_dev(values);
    if s <= f64::EPSILON {
        return 0;
    }
    values
        .iter()
        .filter(|v| v.is_finite() && ((*v - m) / s).abs() > k)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_basic() {
        let s = summarize([1.0, 2.0, 3.0, 4.0]);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        // Population variance of 1..4 is 1.25
        assert!((s.std - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.count, 4);
    }

    #[test]
    fn test_summarize_skips_non_finite() {
        let s = summarize([1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert_eq!(s.count, 2);
        assert!((s.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_empty_is_zero() {
        let s = summarize(std::iter::empty());
        assert_eq!(s, Summary::default());
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert!((percentile(&sorted, 50.0) - 20.0).abs() < 1e-12);
        assert!((percentile(&sorted, 99.0) - 39.6).abs() < 1e-9);
        assert!((percentile(&sorted, 1.0) - 0.4).abs() < 1e-9);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_zscore_outliers() {
        let mut values = vec![10.0; 20];
        values.push(50.0);
        assert_eq!(zscore_outliers(&values, 2.0), 1);
        assert_eq!(zscore_outliers(&[5.0; 10], 2.0), 0);
    }
}

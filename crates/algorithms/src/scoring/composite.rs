//! Weighted fusion of sub-scores

use cropsight_core::{Error, Result};
use serde::Serialize;

/// Tolerance on the sum of a weight vector
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A fused score with its status and a confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeScore<S> {
    pub score: f64,
    pub status: S,
    pub confidence: f64,
}

/// Fail unless `weights` is non-negative and sums to 1
pub fn validate_weights(name: &'static str, weights: &[f64]) -> Result<()> {
    let sum: f64 = weights.iter().sum();
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || (sum - 1.0).abs() > WEIGHT_TOLERANCE
    {
        return Err(Error::InvalidParameter {
            name,
            value: format!("{:?}", weights),
            reason: format!("weights must be non-negative and sum to 1 (sum = {sum})"),
        });
    }
    Ok(())
}

/// `1 - stdev / mean` of the sub-scores, clamped to [0, 1].
///
/// A mean at (or near) zero yields 0 instead of a division by zero.
pub fn dispersion_confidence(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    if mean.abs() < 1e-12 {
        return 0.0;
    }
    let var = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
    (1.0 - var.sqrt() / mean).clamp(0.0, 1.0)
}

/// Weighted sum of `scores`, clamped to [0, 1], with its status and confidence
pub fn fuse<S>(
    name: &'static str,
    scores: &[f64],
    weights: &[f64],
    status: impl FnOnce(f64) -> S,
) -> Result<CompositeScore<S>> {
    validate_weights(name, weights)?;
    if scores.len() != weights.len() {
        return Err(Error::InvalidParameter {
            name,
            value: format!("{} scores", scores.len()),
            reason: format!("expected {} scores to match the weights", weights.len()),
        });
    }

    let score = scores
        .iter()
        .zip(weights)
        .map(|(s, w)| s * w)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    Ok(CompositeScore {
        score,
        status: status(score),
        confidence: dispersion_confidence(scores),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_weighted_sum() {
        let c = fuse("w", &[1.0, 0.5], &[0.75, 0.25], |s| s > 0.5).unwrap();
        assert!((c.score - 0.875).abs() < 1e-12);
        assert!(c.status);
    }

    #[test]
    fn test_equal_scores_full_confidence() {
        assert!((dispersion_confidence(&[0.6, 0.6, 0.6]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_mean_confidence_is_zero() {
        let c = dispersion_confidence(&[0.0, 0.0, 0.0]);
        assert_eq!(c, 0.0);
        assert!(!c.is_nan());
    }

    #[test]
    fn test_dispersed_scores_lower_confidence() {
        // mean 0.6, population std 0.4 -> 1 - 0.4/0.6
        let c = dispersion_confidence(&[0.2, 1.0]);
        assert!((c - (1.0 - 0.4 / 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert!(validate_weights("w", &[0.5, 0.4]).is_err());
        assert!(validate_weights("w", &[1.2, -0.2]).is_err());
        assert!(fuse("w", &[1.0], &[0.5, 0.5], |_| ()).is_err());
    }
}

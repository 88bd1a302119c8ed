//! Crop health thresholds and weights

use crate::imagery::SpectralIndex;
use crate::scoring::{validate_weights, Closed, ThresholdSet};
use cropsight_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Indices scored for crop health, in weight order
pub const HEALTH_INDICES: [SpectralIndex; 5] = [
    SpectralIndex::Ndvi,
    SpectralIndex::Gndvi,
    SpectralIndex::Ndre,
    SpectralIndex::Savi,
    SpectralIndex::Evi,
];

/// Per-index `[stressed_from, healthy_from]` cut points.
///
/// Values equal to a cut stay in the lower level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub ndvi: ThresholdSet,
    pub gndvi: ThresholdSet,
    pub ndre: ThresholdSet,
    pub savi: ThresholdSet,
    pub evi: ThresholdSet,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            ndvi: ThresholdSet::preset([0.3, 0.6], Closed::Upper),
            gndvi: ThresholdSet::preset([0.3, 0.5], Closed::Upper),
            ndre: ThresholdSet::preset([0.1, 0.3], Closed::Upper),
            savi: ThresholdSet::preset([0.2, 0.4], Closed::Upper),
            evi: ThresholdSet::preset([0.2, 0.4], Closed::Upper),
        }
    }
}

impl HealthThresholds {
    /// Thresholds of a scored index; `None` for indices outside [`HEALTH_INDICES`]
    pub fn get(&self, index: SpectralIndex) -> Option<&ThresholdSet> {
        match index {
            SpectralIndex::Ndvi => Some(&self.ndvi),
            SpectralIndex::Gndvi => Some(&self.gndvi),
            SpectralIndex::Ndre => Some(&self.ndre),
            SpectralIndex::Savi => Some(&self.savi),
            SpectralIndex::Evi => Some(&self.evi),
            SpectralIndex::Ndwi | SpectralIndex::Msr | SpectralIndex::Ci => None,
        }
    }
}

/// Pixel-level stress cutoffs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressCutoffs {
    /// Water stress where NDWI is below this (default: -0.1)
    pub water_ndwi_below: f64,
    /// Nutrient stress where NDRE is below this (default: 0.1)
    pub nutrient_ndre_below: f64,
    /// Chlorophyll deficiency where CI is below this (default: 0.1)
    pub chlorophyll_ci_below: f64,
}

impl Default for StressCutoffs {
    fn default() -> Self {
        Self {
            water_ndwi_below: -0.1,
            nutrient_ndre_below: 0.1,
            chlorophyll_ci_below: 0.1,
        }
    }
}

/// Parameters for crop health scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthParams {
    pub thresholds: HealthThresholds,
    /// Weights of NDVI, GNDVI, NDRE, SAVI, EVI (default: 0.30, 0.25, 0.20, 0.15, 0.10)
    pub weights: [f64; 5],
    pub stress: StressCutoffs,
    /// Global z-score above which an NDVI pixel is anomalous (default: 3.0)
    pub statistical_k: f64,
    /// Local z-score above which an NDVI pixel is anomalous (default: 2.0)
    pub spatial_k: f64,
    /// Radius of the local window; 2 gives a 5x5 window (default: 2)
    pub spatial_radius: usize,
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            weights: [0.30, 0.25, 0.20, 0.15, 0.10],
            stress: StressCutoffs::default(),
            statistical_k: 3.0,
            spatial_k: 2.0,
            spatial_radius: 2,
        }
    }
}

impl HealthParams {
    pub fn validate(&self) -> Result<()> {
        validate_weights("health.weights", &self.weights)?;
        for index in HEALTH_INDICES {
            if let Some(t) = self.thresholds.get(index)
                && t.level_count() != 3
            {
                return Err(Error::InvalidParameter {
                    name: "health.thresholds",
                    value: format!("{}: {:?}", index.name(), t.cuts()),
                    reason: "expected two cut points (stressed, healthy)".into(),
                });
            }
        }
        for (name, k) in [
            ("health.statistical_k", self.statistical_k),
            ("health.spatial_k", self.spatial_k),
        ] {
            if !(k.is_finite() && k > 0.0) {
                return Err(Error::InvalidParameter {
                    name,
                    value: k.to_string(),
                    reason: "must be a positive number".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        HealthParams::default().validate().unwrap();
    }

    #[test]
    fn test_every_scored_index_has_thresholds() {
        let t = HealthThresholds::default();
        for index in HEALTH_INDICES {
            assert!(t.get(index).is_some(), "{} has no thresholds", index.name());
        }
        assert!(t.get(SpectralIndex::Ndwi).is_none());
    }

    #[test]
    fn test_rejects_three_cut_thresholds() {
        let mut p = HealthParams::default();
        p.thresholds.ndvi = ThresholdSet::new(vec![0.1, 0.3, 0.6], Closed::Upper).unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let p: HealthParams = serde_json::from_str(
            r#"{"thresholds": {"ndvi": {"cuts": [0.25, 0.55], "closed": "upper"}}}"#,
        )
        .unwrap();
        assert_eq!(p.thresholds.ndvi.cuts(), &[0.25, 0.55]);
        assert_eq!(p.thresholds.gndvi.cuts(), &[0.3, 0.5]);
        assert!((p.weights[0] - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_unsorted_json_thresholds_rejected() {
        let r: std::result::Result<HealthParams, _> = serde_json::from_str(
            r#"{"thresholds": {"ndvi": {"cuts": [0.6, 0.3], "closed": "upper"}}}"#,
        );
        assert!(r.is_err());
    }
}

//! Crop health scoring
//!
//! Classifies the vegetation indices through cascading thresholds, fuses
//! the per-index level scores into an overall health score, measures the
//! extent of water, nutrient and chlorophyll stress, and flags NDVI
//! anomalies both against the whole field and against each pixel's
//! neighbourhood.

mod anomaly;
mod params;
mod scorer;

pub use anomaly::{spatial_anomalies, statistical_anomalies, AnomalyAnalysis, AnomalyMask};
pub use params::{HealthParams, HealthThresholds, StressCutoffs, HEALTH_INDICES};
pub use scorer::{
    score_health, stress_analysis, CropHealthResult, IndexHealth, LevelShares, StressAnalysis,
};

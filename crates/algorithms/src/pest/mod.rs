//! Pest risk scoring
//!
//! Combines spectral stress of the canopy, the spectral-angle anomaly of
//! each pixel, environmental favourability derived from the imagery and
//! per-pest index heuristics. Per pixel, the same evidence is fused into a
//! continuous risk map that is discretized into High, Medium and Low.

mod indicators;
mod params;
mod risk_map;
mod scorer;

pub use indicators::{
    environmental_risk, pest_presence, pest_risk, spectral_stress, visible_mean,
    EnvironmentalRisk, PestPresence, PestRisk, SpectralAnomaly, SpectralStress, StressIndicator,
};
pub use params::{
    EnvironmentParams, FavorableRange, Pest, PestIndicator, PestParams, PestProfile,
    RiskMapParams, StressBands, StressThresholds,
};
pub use risk_map::{risk_map, visible_map, vulnerable_area, RiskMap};
pub use scorer::{score_pest_risk, PestRiskResult};

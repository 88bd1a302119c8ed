//! # Cropsight Algorithms
//!
//! Spectral scoring engine for crop-health, soil-condition and pest-risk
//! assessment.
//!
//! ## Modules
//!
//! - **imagery**: Radiometric/atmospheric correction, spectral indices, spectral angle
//! - **health**: Crop health levels, stress patterns, NDVI anomalies, health map
//! - **soil**: Sensor-based soil condition, soil-type map, moisture cross-check
//! - **pest**: Spectral stress, environmental risk, pest heuristics, risk map
//! - **pipeline**: The full analysis of one field
//! - **scoring**: Threshold sets, level vocabularies, weighted fusion
//! - **statistics**: Summaries, percentiles, focal moments

pub mod health;
pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod pest;
pub mod pipeline;
pub mod scoring;
pub mod soil;
pub mod statistics;

pub use pipeline::{analyze_field, AnalysisConfig, FieldAssessment};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::health::{score_health, CropHealthResult, HealthParams};
    pub use crate::imagery::{
        compute_indices, correct_and_index, IndexMaps, IndexParams, SpectralIndex,
        SpectralParams, SpectralProducts,
    };
    pub use crate::pest::{score_pest_risk, Pest, PestParams, PestRiskResult};
    pub use crate::pipeline::{analyze_field, AnalysisConfig, FieldAssessment};
    pub use crate::scoring::{CompositeScore, HealthLevel, HealthStatus, RiskLevel};
    pub use crate::soil::{score_soil, SoilConditionResult, SoilParams};
    pub use cropsight_core::prelude::*;
}

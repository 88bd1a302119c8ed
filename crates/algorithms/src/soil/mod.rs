//! Soil condition scoring
//!
//! Ground-sensor series for moisture, temperature, pH and electrical
//! conductivity are classified against five-level optimal ranges and fused
//! into a soil health score. The spectral stack contributes a soil-type
//! map and an NDWI-based moisture estimate that cross-checks the sensors.

mod params;
mod scorer;
mod types;

pub use params::{
    ParameterRange, SoilCondition, SoilParameter, SoilParams, SoilRanges, SoilTypeRules,
};
pub use scorer::{
    score_soil, MoistureCrossCheck, ParameterAssessment, QualityLevel, SoilConditionResult,
    SoilStatus,
};
pub use types::{soil_type_map, SoilType, SoilTypeAnalysis, SoilTypeShare};

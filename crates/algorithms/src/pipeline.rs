//! End-to-end field analysis
//!
//! Runs the stages in dependency order: spectral correction, noise
//! reduction and indices, then crop health and soil condition, then pest
//! risk (which reads the crop health map), and finally the overall field
//! assessment. Down-sampled input gets a lighter noise reduction.

use crate::health::{score_health, CropHealthResult, HealthParams};
use crate::imagery::{correct_and_index, SpectralIndex, SpectralParams, SpectralProducts};
use crate::pest::{score_pest_risk, PestParams, PestRiskResult};
use crate::scoring::{fuse, CompositeScore, HealthStatus};
use crate::soil::{score_soil, SoilConditionResult, SoilParams};
use crate::statistics::{summarize, Summary};
use cropsight_core::raster::BandStack;
use cropsight_core::{Result, SensorSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

/// Configuration of a full analysis; every field has a default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Block-average the raw stack by this factor first; 1 keeps full
    /// resolution (default: 1)
    pub downsample: usize,
    pub spectral: SpectralParams,
    pub health: HealthParams,
    pub soil: SoilParams,
    pub pest: PestParams,
    /// Weights of crop health, soil health and (1 - pest risk) (default: 0.4, 0.3, 0.3)
    pub overall_weights: [f64; 3],
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            downsample: 1,
            spectral: SpectralParams::default(),
            health: HealthParams::default(),
            soil: SoilParams::default(),
            pest: PestParams::default(),
            overall_weights: [0.4, 0.3, 0.3],
        }
    }
}

/// Summary statistics of one index map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexSummary {
    pub index: SpectralIndex,
    pub summary: Summary,
}

/// Everything known about a field after one analysis
#[derive(Debug, Clone, Serialize)]
pub struct FieldAssessment {
    /// Analysed (possibly down-sampled) dimensions as (rows, cols)
    pub shape: (usize, usize),
    pub downsample: usize,
    pub indices: Vec<IndexSummary>,
    pub health: CropHealthResult,
    pub soil: SoilConditionResult,
    pub pest: PestRiskResult,
    /// Crop health, soil health and (1 - pest risk) fused
    pub overall: CompositeScore<HealthStatus>,
    /// Corrected stack and index maps
    #[serde(skip)]
    pub spectral: SpectralProducts,
}

/// Analyse one field from its raw band stack and sensor readings
pub fn analyze_field(
    raw: &BandStack,
    sensors: &SensorSeries,
    config: &AnalysisConfig,
) -> Result<FieldAssessment> {
    let _span = info_span!("analyze_field", rows = raw.rows(), cols = raw.cols()).entered();

    let (input, spectral_params) = if config.downsample == 1 {
        (None, config.spectral.clone())
    } else {
        let small = raw.downsample(config.downsample)?;
        debug!(
            factor = config.downsample,
            rows = small.rows(),
            cols = small.cols(),
            "down-sampled input, lighter noise reduction"
        );
        (Some(small), config.spectral.fast_path())
    };
    let raw = input.as_ref().unwrap_or(raw);

    let spectral = info_span!("spectral").in_scope(|| correct_and_index(raw, &spectral_params))?;
    let maps = &spectral.indices;
    let indices: Vec<IndexSummary> = SpectralIndex::ALL
        .iter()
        .map(|&index| IndexSummary {
            index,
            summary: summarize(maps.get(index).data().iter().copied()),
        })
        .collect();
    info!(
        ndvi = maps.mean(SpectralIndex::Ndvi),
        ndwi = maps.mean(SpectralIndex::Ndwi),
        "indices computed"
    );

    let health = info_span!("health").in_scope(|| score_health(maps, &config.health))?;
    info!(
        score = health.overall.score,
        status = health.overall.status.label(),
        "crop health"
    );

    let soil = info_span!("soil")
        .in_scope(|| score_soil(maps, &spectral.corrected, sensors, &config.soil))?;
    info!(
        score = soil.overall.score,
        dominant_type = soil.soil_types.dominant.label(),
        "soil condition"
    );

    let pest = info_span!("pest")
        .in_scope(|| score_pest_risk(maps, &spectral.corrected, &health, &config.pest))?;
    info!(
        risk = pest.overall.score,
        level = pest.overall.status.label(),
        vulnerable_pct = pest.vulnerable_area_percentage,
        "pest risk"
    );

    let overall = fuse(
        "overall_weights",
        &[
            health.overall.score,
            soil.overall.score,
            1.0 - pest.overall.score,
        ],
        &config.overall_weights,
        HealthStatus::from_score,
    )?;
    info!(
        score = overall.score,
        status = overall.status.label(),
        "field assessment"
    );

    Ok(FieldAssessment {
        shape: maps.shape(),
        downsample: config.downsample,
        indices,
        health,
        soil,
        pest,
        overall,
        spectral,
    })
}

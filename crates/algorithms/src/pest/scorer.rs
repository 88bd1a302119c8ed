//! Pest risk scoring

use super::indicators::{
    environmental_risk, pest_presence, pest_risk, spectral_stress, EnvironmentalRisk, PestPresence,
    PestRisk, SpectralAnomaly, SpectralStress,
};
use super::params::PestParams;
use super::risk_map::{risk_map, visible_map, vulnerable_area, RiskMap};
use crate::health::CropHealthResult;
use crate::imagery::{spectral_angle_anomaly, IndexMaps};
use crate::scoring::{fuse, CompositeScore, RiskLevel};
use cropsight_core::raster::BandStack;
use cropsight_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

/// Output of the pest risk scorer
#[derive(Debug, Clone, Serialize)]
pub struct PestRiskResult {
    pub spectral_stress: SpectralStress,
    pub anomaly: SpectralAnomaly,
    pub environment: EnvironmentalRisk,
    pub pests: Vec<PestRisk>,
    pub presence: PestPresence,
    pub risk_map: RiskMap,
    /// Percentage (0-100) of pixels at high risk whose crop is not healthy
    pub vulnerable_area_percentage: f64,
    /// Spectral stress, environment and pest risk fused
    pub overall: CompositeScore<RiskLevel>,
}

/// Score pest risk from the index maps, the corrected stack and the crop
/// health assessment of the same field.
pub fn score_pest_risk(
    maps: &IndexMaps,
    stack: &BandStack,
    health: &CropHealthResult,
    params: &PestParams,
) -> Result<PestRiskResult> {
    params.validate()?;
    let (rows, cols) = maps.shape();
    if stack.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: stack.rows(),
            ac: stack.cols(),
        });
    }

    let spectral_stress = spectral_stress(maps, params);
    let anomaly = SpectralAnomaly::new(spectral_angle_anomaly(stack)?, params.anomaly_cut);
    let environment = environmental_risk(maps, stack, params)?;
    debug!(
        stress = spectral_stress.score,
        anomaly_pct = anomaly.percentage,
        environment = environment.score.score,
        "pest indicators"
    );

    let pests: Vec<PestRisk> = params
        .pests
        .iter()
        .map(|profile| pest_risk(maps, profile, params))
        .collect();
    let presence = pest_presence(&pests, params.presence_threshold);

    let visible = visible_map(stack)?;
    let risk_map = risk_map(maps, &anomaly.map, &visible, params)?;
    let vulnerable_area_percentage = vulnerable_area(&risk_map, health)?;

    let overall = fuse(
        "pest.overall_weights",
        &[
            spectral_stress.score,
            environment.score.score,
            presence.mean_risk,
        ],
        &params.overall_weights,
        |s| params.risk_level(s),
    )?;

    Ok(PestRiskResult {
        spectral_stress,
        anomaly,
        environment,
        pests,
        presence,
        risk_map,
        vulnerable_area_percentage,
        overall,
    })
}

//! Soil condition scoring

use super::params::{SoilCondition, SoilParameter, SoilParams};
use super::types::{soil_type_map, SoilTypeAnalysis};
use crate::imagery::{band_math, IndexMaps};
use crate::scoring::{fuse, CompositeScore};
use crate::statistics::{summarize, zscore_outliers, Summary};
use cropsight_colormap::encode_levels;
use cropsight_core::raster::{BandStack, Raster};
use cropsight_core::{Error, Result, SensorSeries};
use serde::Serialize;
use tracing::{debug, warn};

/// Four-step status of the soil health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SoilStatus {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SoilStatus {
    /// Bucket a score at 0.8 / 0.6 / 0.4 (lower bound inclusive)
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Soil quality index level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Assessment of one sensor-measured soil parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParameterAssessment {
    pub parameter: SoilParameter,
    pub summary: Summary,
    /// Condition of the mean reading; `None` when the series holds only gaps
    pub condition: Option<SoilCondition>,
    pub label: &'static str,
    pub recommendation: &'static str,
    pub score: f64,
    /// Samples with |z| above the outlier threshold
    pub outliers: usize,
    /// Samples below the extreme-low cut
    pub extreme_low: usize,
    /// Samples above the extreme-high cut
    pub extreme_high: usize,
}

/// Spectral estimate of soil moisture, compared with the sensors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoistureCrossCheck {
    pub spectral_mean: f64,
    /// `None` when the moisture series holds only gaps
    pub sensor_mean: Option<f64>,
    /// `|spectral_mean - sensor_mean|`
    pub discrepancy: Option<f64>,
    /// Whether the discrepancy is within tolerance (vacuously true without
    /// sensor readings)
    pub consistent: bool,
}

/// Output of the soil condition scorer
#[derive(Debug, Clone, Serialize)]
pub struct SoilConditionResult {
    pub parameters: Vec<ParameterAssessment>,
    pub moisture_check: MoistureCrossCheck,
    pub soil_types: SoilTypeAnalysis,
    pub overall: CompositeScore<SoilStatus>,
    pub quality_index: f64,
    pub quality_level: QualityLevel,
    /// Parameters whose series held no finite reading
    pub missing: Vec<SoilParameter>,
    /// Recommendations of every non-optimal parameter
    pub recommendations: Vec<&'static str>,
    /// Per-pixel spectral moisture condition codes (1 extreme, 2 off, 3 optimal)
    #[serde(skip)]
    pub moisture_map: Raster<u8>,
    #[serde(skip)]
    pub moisture_map_rgb: Vec<u8>,
}

impl SoilConditionResult {
    pub fn parameter(&self, parameter: SoilParameter) -> Option<&ParameterAssessment> {
        self.parameters.iter().find(|p| p.parameter == parameter)
    }
}

fn assess_parameter(
    parameter: SoilParameter,
    sensors: &SensorSeries,
    params: &SoilParams,
) -> Result<ParameterAssessment> {
    let name = parameter.series_name();
    let values = sensors.require(name)?;
    let range = params.ranges.get(parameter);
    let summary = summarize(values.iter().copied());

    let finite = || values.iter().copied().filter(|v| v.is_finite());
    if !sensors.has_readings(name) {
        warn!(
            parameter = name,
            samples = values.len(),
            score = params.missing_score,
            "sensor series holds no valid readings"
        );
        return Ok(ParameterAssessment {
            parameter,
            summary,
            condition: None,
            label: "No Data",
            recommendation: "Check the sensor; the series holds no valid readings",
            score: params.missing_score,
            outliers: 0,
            extreme_low: 0,
            extreme_high: 0,
        });
    }

    let condition = range.condition(summary.mean);
    Ok(ParameterAssessment {
        parameter,
        summary,
        condition: Some(condition),
        label: condition.label(parameter),
        recommendation: condition.recommendation(parameter),
        score: range.score(summary.mean),
        outliers: zscore_outliers(values, params.outlier_k),
        extreme_low: finite().filter(|&v| v < range.extreme_low()).count(),
        extreme_high: finite().filter(|&v| v > range.extreme_high()).count(),
    })
}

/// Score soil condition from sensor readings and spectral evidence.
///
/// The sensor means drive the parameter scores; the NDWI-based moisture
/// estimate is reported alongside and only logged when it disagrees.
pub fn score_soil(
    maps: &IndexMaps,
    stack: &BandStack,
    sensors: &SensorSeries,
    params: &SoilParams,
) -> Result<SoilConditionResult> {
    params.validate()?;
    sensors.validate()?;
    let (rows, cols) = maps.shape();
    if stack.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: stack.rows(),
            ac: stack.cols(),
        });
    }

    let parameters = SoilParameter::ALL
        .iter()
        .map(|&p| assess_parameter(p, sensors, params))
        .collect::<Result<Vec<_>>>()?;
    for p in &parameters {
        debug!(
            parameter = p.parameter.series_name(),
            mean = p.summary.mean,
            condition = p.label,
            score = p.score,
            "soil parameter"
        );
    }

    // Spectral moisture
    let (base, gain) = (params.spectral_moisture_base, params.spectral_moisture_gain);
    let spectral = band_math(&maps.ndwi, |v| (base + gain * v).clamp(0.0, 1.0))?;
    let spectral_mean = spectral.statistics().mean.unwrap_or(0.0);
    let sensor_mean = parameters
        .iter()
        .find(|p| p.parameter == SoilParameter::Moisture && p.condition.is_some())
        .map(|p| p.summary.mean);
    let discrepancy = sensor_mean.map(|m| (spectral_mean - m).abs());
    let consistent = discrepancy.is_none_or(|d| d <= params.moisture_discrepancy);
    if let (Some(sensor_mean), Some(discrepancy)) = (sensor_mean, discrepancy)
        && !consistent
    {
        warn!(
            spectral_mean,
            sensor_mean, discrepancy, "spectral and sensor soil moisture disagree"
        );
    }

    let moisture_map = params
        .ranges
        .moisture
        .thresholds()
        .classify_raster(&spectral, |l| SoilCondition::from_level(l).code())?;
    let moisture_map_rgb = encode_levels(&moisture_map);

    let soil_types = soil_type_map(stack, &params.soil_types)?;

    let scores: Vec<f64> = parameters.iter().map(|p| p.score).collect();
    let mut overall = fuse("soil.weights", &scores, &params.weights, SoilStatus::from_score)?;

    // Confidence shrinks with the share of parameters that had readings
    let missing: Vec<SoilParameter> = parameters
        .iter()
        .filter(|p| p.condition.is_none())
        .map(|p| p.parameter)
        .collect();
    let covered = 1.0 - missing.len() as f64 / parameters.len() as f64;
    overall.confidence *= covered;

    let recommendations = parameters
        .iter()
        .filter(|p| p.condition != Some(SoilCondition::Optimal))
        .map(|p| p.recommendation)
        .collect();

    Ok(SoilConditionResult {
        parameters,
        moisture_check: MoistureCrossCheck {
            spectral_mean,
            sensor_mean,
            discrepancy,
            consistent,
        },
        soil_types,
        missing,
        quality_index: overall.score,
        quality_level: QualityLevel::from_score(overall.score),
        overall,
        recommendations,
        moisture_map,
        moisture_map_rgb,
    })
}

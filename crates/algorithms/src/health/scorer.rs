//! Crop health scoring

use super::anomaly::{spatial_anomalies, statistical_anomalies, AnomalyAnalysis};
use super::params::{HealthParams, HEALTH_INDICES};
use crate::imagery::{IndexMaps, SpectralIndex};
use crate::scoring::{fuse, CompositeScore, HealthLevel, HealthStatus, LevelCode};
use crate::statistics::{summarize, Summary};
use cropsight_colormap::encode_levels;
use cropsight_core::raster::Raster;
use cropsight_core::Result;
use ndarray::Zip;
use serde::Serialize;
use tracing::debug;

/// Percentage (0-100) of pixels in each health level
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LevelShares {
    pub unhealthy: f64,
    pub stressed: f64,
    pub healthy: f64,
}

impl LevelShares {
    fn from_percentages(p: &[f64]) -> Self {
        let at = |i: usize| p.get(i).copied().unwrap_or(0.0);
        Self {
            unhealthy: at(0),
            stressed: at(1),
            healthy: at(2),
        }
    }

    pub fn get(&self, level: HealthLevel) -> f64 {
        match level {
            HealthLevel::Unhealthy => self.unhealthy,
            HealthLevel::Stressed => self.stressed,
            HealthLevel::Healthy => self.healthy,
        }
    }
}

/// Health assessment of one index
#[derive(Debug, Clone, Serialize)]
pub struct IndexHealth {
    pub index: SpectralIndex,
    pub summary: Summary,
    pub levels: LevelShares,
    /// Level of the mean value
    pub level: HealthLevel,
    pub health_score: f64,
}

/// Percentage (0-100) of pixels under each kind of stress
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StressAnalysis {
    pub water_stress_percentage: f64,
    pub nutrient_stress_percentage: f64,
    pub chlorophyll_stress_percentage: f64,
    /// Pixels under at least one kind of stress
    pub overall_stress_percentage: f64,
}

/// Output of the crop health scorer
#[derive(Debug, Clone, Serialize)]
pub struct CropHealthResult {
    pub indices: Vec<IndexHealth>,
    pub overall: CompositeScore<HealthStatus>,
    pub stress: StressAnalysis,
    pub anomalies: AnomalyAnalysis,
    /// Distribution of the health map
    pub map_levels: LevelShares,
    /// Per-pixel NDVI health level codes (1 unhealthy, 2 stressed, 3 healthy)
    #[serde(skip)]
    pub health_map: Raster<u8>,
    /// `health_map` as row-major RGB
    #[serde(skip)]
    pub health_map_rgb: Vec<u8>,
}

impl CropHealthResult {
    pub fn index(&self, index: SpectralIndex) -> Option<&IndexHealth> {
        self.indices.iter().find(|h| h.index == index)
    }

    /// Health level of one pixel of the health map
    pub fn level_at(&self, row: usize, col: usize) -> Option<HealthLevel> {
        self.health_map
            .get(row, col)
            .ok()
            .and_then(HealthLevel::from_code)
    }
}

fn index_health(maps: &IndexMaps, index: SpectralIndex, params: &HealthParams) -> IndexHealth {
    let raster = maps.get(index);
    let summary = summarize(raster.data().iter().copied());
    let (levels, level) = match params.thresholds.get(index) {
        Some(t) => (
            LevelShares::from_percentages(&t.level_percentages(raster.data().iter().copied())),
            HealthLevel::from_level(t.level(summary.mean)),
        ),
        None => (LevelShares::default(), HealthLevel::Unhealthy),
    };
    IndexHealth {
        index,
        summary,
        levels,
        level,
        health_score: level.score(),
    }
}

/// Percentage of pixels in each stress category
pub fn stress_analysis(maps: &IndexMaps, params: &HealthParams) -> StressAnalysis {
    let cut = &params.stress;
    let water = |v: f64| v < cut.water_ndwi_below;
    let nutrient = |v: f64| v < cut.nutrient_ndre_below;
    let chlorophyll = |v: f64| v < cut.chlorophyll_ci_below;

    let mut any = 0usize;
    Zip::from(maps.ndwi.data())
        .and(maps.ndre.data())
        .and(maps.ci.data())
        .for_each(|&w, &n, &c| {
            if water(w) || nutrient(n) || chlorophyll(c) {
                any += 1;
            }
        });
    let total = maps.ndwi.len().max(1) as f64;

    StressAnalysis {
        water_stress_percentage: maps.ndwi.percent_where(water),
        nutrient_stress_percentage: maps.ndre.percent_where(nutrient),
        chlorophyll_stress_percentage: maps.ci.percent_where(chlorophyll),
        overall_stress_percentage: 100.0 * any as f64 / total,
    }
}

/// Score crop health from the index maps.
///
/// Each of NDVI, GNDVI, NDRE, SAVI and EVI is classified through its
/// thresholds; the level scores of the index means are fused into the
/// overall score.
pub fn score_health(maps: &IndexMaps, params: &HealthParams) -> Result<CropHealthResult> {
    params.validate()?;

    let indices: Vec<IndexHealth> = HEALTH_INDICES
        .iter()
        .map(|&index| index_health(maps, index, params))
        .collect();
    for h in &indices {
        debug!(
            index = h.index.name(),
            mean = h.summary.mean,
            level = h.level.label(),
            "index health"
        );
    }

    let scores: Vec<f64> = indices.iter().map(|h| h.health_score).collect();
    let overall = fuse("health.weights", &scores, &params.weights, HealthStatus::from_score)?;

    let stress = stress_analysis(maps, params);

    let anomalies = AnomalyAnalysis {
        statistical: statistical_anomalies(&maps.ndvi, params.statistical_k)?,
        spatial: spatial_anomalies(&maps.ndvi, params.spatial_radius, params.spatial_k)?,
    };

    let health_map = params
        .thresholds
        .ndvi
        .classify_raster(&maps.ndvi, |l| HealthLevel::from_level(l).code())?;
    let map_levels = LevelShares {
        unhealthy: health_map.percent_where(|c| c == HealthLevel::Unhealthy.code()),
        stressed: health_map.percent_where(|c| c == HealthLevel::Stressed.code()),
        healthy: health_map.percent_where(|c| c == HealthLevel::Healthy.code()),
    };
    let health_map_rgb = encode_levels(&health_map);

    Ok(CropHealthResult {
        indices,
        overall,
        stress,
        anomalies,
        map_levels,
        health_map,
        health_map_rgb,
    })
}

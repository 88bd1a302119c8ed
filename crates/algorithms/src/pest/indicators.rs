//! Field-level pest risk indicators
//!
//! All indicators here reduce the field to scalars: index means, band
//! means and the share of spectrally anomalous pixels.

use super::params::{EnvironmentParams, Pest, PestParams, PestProfile};
use crate::imagery::{IndexMaps, SpectralIndex};
use crate::scoring::{fuse, CompositeScore, RiskLevel};
use crate::statistics::mean;
use cropsight_core::raster::{Band, BandStack, Raster};
use cropsight_core::Result;
use serde::Serialize;

/// Stress level of one index mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StressIndicator {
    pub index: SpectralIndex,
    pub mean: f64,
    pub level: RiskLevel,
    pub score: f64,
}

/// Spectral stress over NDVI, GNDVI and NDRE
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralStress {
    pub indicators: Vec<StressIndicator>,
    /// Mean of the indicator scores
    pub score: f64,
}

pub fn spectral_stress(maps: &IndexMaps, params: &PestParams) -> SpectralStress {
    let indicators: Vec<StressIndicator> = params
        .stress
        .bands()
        .iter()
        .map(|&(index, bands)| {
            let m = maps.mean(index);
            let level = bands.level(m);
            StressIndicator {
                index,
                mean: m,
                level,
                score: level.score(),
            }
        })
        .collect();
    let scores: Vec<f64> = indicators.iter().map(|i| i.score).collect();
    SpectralStress {
        score: mean(&scores),
        indicators,
    }
}

/// Share of spectrally anomalous pixels
#[derive(Debug, Clone, Serialize)]
pub struct SpectralAnomaly {
    pub mean: f64,
    /// Percentage (0-100) of pixels above the anomaly cut
    pub percentage: f64,
    #[serde(skip)]
    pub map: Raster<f64>,
}

impl SpectralAnomaly {
    pub fn new(map: Raster<f64>, cut: f64) -> Self {
        Self {
            mean: map.statistics().mean.unwrap_or(0.0),
            percentage: map.percent_where(|v| v > cut),
            map,
        }
    }
}

/// Environmental proxies and how much they favour pests
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentalRisk {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    pub moisture: f64,
    /// Mean visible reflectance
    pub light: f64,
    pub temperature_favorability: f64,
    pub humidity_favorability: f64,
    pub moisture_favorability: f64,
    pub light_favorability: f64,
    pub score: CompositeScore<RiskLevel>,
}

fn band_mean(stack: &BandStack, band: Band) -> Result<f64> {
    Ok(stack.band(band)?.mean().unwrap_or(0.0))
}

/// Mean visible (blue, green, red) reflectance of the field
pub fn visible_mean(stack: &BandStack) -> Result<f64> {
    let total = band_mean(stack, Band::Blue)?
        + band_mean(stack, Band::Green)?
        + band_mean(stack, Band::Red)?;
    Ok(total / 3.0)
}

pub fn environmental_risk(
    maps: &IndexMaps,
    stack: &BandStack,
    params: &PestParams,
) -> Result<EnvironmentalRisk> {
    let env: &EnvironmentParams = &params.environment;
    let ndwi = maps.mean(SpectralIndex::Ndwi);

    let temperature = env.temperature_base + env.temperature_gain * band_mean(stack, Band::Swir1)?;
    let humidity = (env.humidity_base + env.humidity_gain * ndwi).clamp(0.0, 100.0);
    let moisture = (env.moisture_base + env.moisture_gain * ndwi).clamp(0.0, 1.0);
    let light = visible_mean(stack)?;

    let temperature_favorability = env.temperature.favorability(temperature);
    let humidity_favorability = env.humidity.favorability(humidity);
    let moisture_favorability = env.moisture.favorability(moisture);
    let light_favorability = env.light_favorability(light);

    let score = fuse(
        "pest.environment.weights",
        &[
            temperature_favorability,
            humidity_favorability,
            moisture_favorability,
            light_favorability,
        ],
        &env.weights,
        |s| params.risk_level(s),
    )?;

    Ok(EnvironmentalRisk {
        temperature,
        humidity,
        moisture,
        light,
        temperature_favorability,
        humidity_favorability,
        moisture_favorability,
        light_favorability,
        score,
    })
}

/// Risk of one pest
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PestRisk {
    pub pest: Pest,
    pub risk: f64,
    pub level: RiskLevel,
}

/// Mean relative shortfall of the profile's index means below their
/// thresholds, clamped to [0, 1]
pub fn pest_risk(maps: &IndexMaps, profile: &PestProfile, params: &PestParams) -> PestRisk {
    let shortfalls: Vec<f64> = profile
        .indicators
        .iter()
        .map(|i| i.risk(maps.mean(i.index)))
        .collect();
    let risk = mean(&shortfalls).clamp(0.0, 1.0);
    PestRisk {
        pest: profile.pest,
        risk,
        level: params.risk_level(risk),
    }
}

/// Summary of the per-pest risks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PestPresence {
    pub max_risk: f64,
    pub mean_risk: f64,
    /// Pests whose risk exceeds the presence threshold
    pub likely_pests: Vec<Pest>,
}

pub fn pest_presence(risks: &[PestRisk], threshold: f64) -> PestPresence {
    let values: Vec<f64> = risks.iter().map(|r| r.risk).collect();
    PestPresence {
        max_risk: values.iter().copied().fold(0.0, f64::max),
        mean_risk: mean(&values),
        likely_pests: risks
            .iter()
            .filter(|r| r.risk > threshold)
            .map(|r| r.pest)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{compute_indices, IndexParams};

    /// Blue, Green, Red, NIR, RE1, RE2, RE3, SWIR1
    fn field(spectrum: [f64; 8]) -> (IndexMaps, BandStack) {
        let stack = BandStack::uniform(5, 5, &spectrum).unwrap();
        let maps = compute_indices(&stack, &IndexParams::default()).unwrap();
        (maps, stack)
    }

    #[test]
    fn test_vigorous_canopy_low_stress() {
        let (maps, _) = field([0.05, 0.08, 0.1, 0.6, 0.25, 0.4, 0.5, 0.2]);
        let s = spectral_stress(&maps, &PestParams::default());
        assert!(s.indicators.iter().all(|i| i.level == RiskLevel::Low));
        assert!((s.score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_canopy_high_stress() {
        let (maps, _) = field([0.15, 0.2, 0.25, 0.3, 0.28, 0.29, 0.3, 0.35]);
        let s = spectral_stress(&maps, &PestParams::default());
        assert!(s.indicators.iter().all(|i| i.level == RiskLevel::High));
        assert!((s.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_environment_proxies() {
        // SWIR1 0.3 → 22 °C; NDWI = (0.1 - 0.5) / 0.6
        let (maps, stack) = field([0.05, 0.1, 0.1, 0.5, 0.25, 0.4, 0.45, 0.3]);
        let env = environmental_risk(&maps, &stack, &PestParams::default()).unwrap();
        let ndwi: f64 = -0.4 / 0.6;
        assert!((env.temperature - 22.0).abs() < 1e-9);
        assert_eq!(env.temperature_favorability, 1.0);
        // 50 + 100 * NDWI is negative and clamps to 0
        assert_eq!(env.humidity, 0.0);
        assert_eq!(env.humidity_favorability, 0.0);
        assert!((env.moisture - (0.5 + 0.3 * ndwi)).abs() < 1e-6);
        assert!((env.light - 0.25 / 3.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&env.score.score));
    }

    #[test]
    fn test_pest_risk_and_presence() {
        // NDVI ≈ 0.0909, GNDVI = 0.2, NDRE ≈ 0.0345
        let (maps, _) = field([0.15, 0.2, 0.25, 0.3, 0.28, 0.29, 0.3, 0.35]);
        let params = PestParams::default();
        let risks: Vec<PestRisk> = params
            .pests
            .iter()
            .map(|p| pest_risk(&maps, p, &params))
            .collect();
        let thrips = risks.iter().find(|r| r.pest == Pest::Thrips).unwrap();
        let ndvi: f64 = 0.05 / 0.55;
        let ndre: f64 = 0.02 / 0.58;
        let expected = ((0.5 - ndvi) / 0.5 + (0.25 - ndre) / 0.25) / 2.0;
        assert!((thrips.risk - expected).abs() < 1e-6);

        let presence = pest_presence(&risks, params.presence_threshold);
        assert!(presence.max_risk >= presence.mean_risk);
        assert!(presence.likely_pests.contains(&Pest::Thrips));
    }

    #[test]
    fn test_healthy_field_has_no_pests() {
        let (maps, _) = field([0.05, 0.08, 0.1, 0.6, 0.25, 0.4, 0.5, 0.2]);
        let params = PestParams::default();
        let risks: Vec<PestRisk> = params
            .pests
            .iter()
            .map(|p| pest_risk(&maps, p, &params))
            .collect();
        let presence = pest_presence(&risks, params.presence_threshold);
        assert_eq!(presence.max_risk, 0.0);
        assert!(presence.likely_pests.is_empty());
    }

    #[test]
    fn test_anomaly_share() {
        let mut map = Raster::filled(2, 2, 0.1);
        map.set(0, 0, 0.9).unwrap();
        let a = SpectralAnomaly::new(map, 0.5);
        assert!((a.percentage - 25.0).abs() < 1e-12);
        assert!((a.mean - 0.3).abs() < 1e-12);
    }
}

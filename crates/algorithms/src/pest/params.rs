//! Pest risk thresholds, pest profiles and fusion weights

use crate::imagery::SpectralIndex;
use crate::scoring::{validate_weights, RiskLevel};
use cropsight_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Stress bands of one index: below `high_below` is High, below
/// `medium_below` is Medium, anything else is Low
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressBands {
    pub high_below: f64,
    pub medium_below: f64,
}

impl StressBands {
    pub const fn new(high_below: f64, medium_below: f64) -> Self {
        Self {
            high_below,
            medium_below,
        }
    }

    pub fn level(&self, value: f64) -> RiskLevel {
        if value < self.high_below {
            RiskLevel::High
        } else if value < self.medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Relative shortfall below `medium_below`, clamped to [0, 1]
    pub fn deficit(&self, value: f64) -> f64 {
        ((self.medium_below - value) / self.medium_below).clamp(0.0, 1.0)
    }
}

/// Stress bands of the indices read by the spectral stress indicators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressThresholds {
    pub ndvi: StressBands,
    pub gndvi: StressBands,
    pub ndre: StressBands,
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self {
            ndvi: StressBands::new(0.3, 0.5),
            gndvi: StressBands::new(0.25, 0.45),
            ndre: StressBands::new(0.1, 0.2),
        }
    }
}

impl StressThresholds {
    /// The indices with their bands, in report order
    pub fn bands(&self) -> [(SpectralIndex, StressBands); 3] {
        [
            (SpectralIndex::Ndvi, self.ndvi),
            (SpectralIndex::Gndvi, self.gndvi),
            (SpectralIndex::Ndre, self.ndre),
        ]
    }
}

/// A value range that pests favour.
///
/// Inside `[low, high]` the favourability is 1; it falls off linearly to
/// 0 at `falloff` outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FavorableRange {
    pub low: f64,
    pub high: f64,
    pub falloff: f64,
}

impl FavorableRange {
    pub const fn new(low: f64, high: f64, falloff: f64) -> Self {
        Self { low, high, falloff }
    }

    pub fn favorability(&self, value: f64) -> f64 {
        let distance = if value < self.low {
            self.low - value
        } else if value > self.high {
            value - self.high
        } else {
            0.0
        };
        (1.0 - distance / self.falloff).clamp(0.0, 1.0)
    }
}

/// Environmental proxies derived from the spectral stack, and the ranges
/// in which they favour pests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentParams {
    /// Canopy temperature proxy °C = base + gain * mean(SWIR1) (default: 10, 40)
    pub temperature_base: f64,
    pub temperature_gain: f64,
    /// Humidity proxy % = base + gain * mean(NDWI), clamped to [0, 100] (default: 50, 100)
    pub humidity_base: f64,
    pub humidity_gain: f64,
    /// Moisture proxy = base + gain * mean(NDWI), clamped to [0, 1] (default: 0.5, 0.3)
    pub moisture_base: f64,
    pub moisture_gain: f64,
    pub temperature: FavorableRange,
    pub humidity: FavorableRange,
    pub moisture: FavorableRange,
    /// Visible reflectance at which light stops favouring pests (default: 0.3)
    pub light_max: f64,
    /// Weights of temperature, humidity, moisture, light (default: 0.3, 0.3, 0.2, 0.2)
    pub weights: [f64; 4],
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            temperature_base: 10.0,
            temperature_gain: 40.0,
            humidity_base: 50.0,
            humidity_gain: 100.0,
            moisture_base: 0.5,
            moisture_gain: 0.3,
            temperature: FavorableRange::new(20.0, 30.0, 10.0),
            humidity: FavorableRange::new(60.0, 90.0, 30.0),
            moisture: FavorableRange::new(0.4, 0.7, 0.3),
            light_max: 0.3,
            weights: [0.3, 0.3, 0.2, 0.2],
        }
    }
}

impl EnvironmentParams {
    /// Favourability of low light: 1 at zero visible reflectance, 0 at `light_max`
    pub fn light_favorability(&self, visible: f64) -> f64 {
        ((self.light_max - visible) / self.light_max).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pest {
    Aphids,
    Whiteflies,
    Thrips,
    SpiderMites,
    Caterpillars,
}

impl Pest {
    pub const ALL: [Pest; 5] = [
        Self::Aphids,
        Self::Whiteflies,
        Self::Thrips,
        Self::SpiderMites,
        Self::Caterpillars,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Aphids => "Aphids",
            Self::Whiteflies => "Whiteflies",
            Self::Thrips => "Thrips",
            Self::SpiderMites => "Spider mites",
            Self::Caterpillars => "Caterpillars",
        }
    }

    /// Indices whose depression signals the pest, with the healthy floor of each
    pub fn default_indicators(self) -> [PestIndicator; 2] {
        use SpectralIndex::*;
        let pair = |a, ta, b, tb| [PestIndicator::new(a, ta), PestIndicator::new(b, tb)];
        match self {
            Self::Aphids => pair(Ndvi, 0.5, Gndvi, 0.45),
            Self::Whiteflies => pair(Gndvi, 0.45, Ci, 1.0),
            Self::Thrips => pair(Ndvi, 0.5, Ndre, 0.25),
            Self::SpiderMites => pair(Ndre, 0.25, Savi, 0.4),
            Self::Caterpillars => pair(Ndvi, 0.5, Evi, 0.4),
        }
    }
}

/// One index-threshold pair of a pest profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PestIndicator {
    pub index: SpectralIndex,
    pub threshold: f64,
}

impl PestIndicator {
    pub const fn new(index: SpectralIndex, threshold: f64) -> Self {
        Self { index, threshold }
    }

    /// Relative shortfall of `mean` below the threshold (0 when above)
    pub fn risk(&self, mean: f64) -> f64 {
        ((self.threshold - mean) / self.threshold).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestProfile {
    pub pest: Pest,
    pub indicators: Vec<PestIndicator>,
}

impl PestProfile {
    pub fn default_for(pest: Pest) -> Self {
        Self {
            pest,
            indicators: pest.default_indicators().to_vec(),
        }
    }
}

/// Weights and shaping of the per-pixel risk map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMapParams {
    /// Weights of stress deficit, spectral anomaly, moisture, light (default: 0.4, 0.2, 0.2, 0.2)
    pub weights: [f64; 4],
    /// Moisture favourability is `(NDWI + offset) / span` (default: 0.1, 0.4)
    pub moisture_offset: f64,
    pub moisture_span: f64,
}

impl Default for RiskMapParams {
    fn default() -> Self {
        Self {
            weights: [0.4, 0.2, 0.2, 0.2],
            moisture_offset: 0.1,
            moisture_span: 0.4,
        }
    }
}

impl RiskMapParams {
    pub fn moisture_favorability(&self, ndwi: f64) -> f64 {
        ((ndwi + self.moisture_offset) / self.moisture_span).clamp(0.0, 1.0)
    }
}

/// Parameters for pest risk scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PestParams {
    pub stress: StressThresholds,
    pub environment: EnvironmentParams,
    pub pests: Vec<PestProfile>,
    pub risk_map: RiskMapParams,
    /// Spectral-angle anomaly above which a pixel counts as anomalous (default: 0.5)
    pub anomaly_cut: f64,
    /// Pest risk above which a pest counts as present (default: 0.6)
    pub presence_threshold: f64,
    /// Risk score cut points of Medium and High (default: 0.6, 0.8)
    pub medium_from: f64,
    pub high_from: f64,
    /// Weights of spectral stress, environment, pest risk (default: 0.3, 0.3, 0.4)
    pub overall_weights: [f64; 3],
}

impl Default for PestParams {
    fn default() -> Self {
        Self {
            stress: StressThresholds::default(),
            environment: EnvironmentParams::default(),
            pests: Pest::ALL.iter().map(|&p| PestProfile::default_for(p)).collect(),
            risk_map: RiskMapParams::default(),
            anomaly_cut: 0.5,
            presence_threshold: 0.6,
            medium_from: 0.6,
            high_from: 0.8,
            overall_weights: [0.3, 0.3, 0.4],
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be a positive number".into(),
        })
    }
}

impl PestParams {
    pub fn validate(&self) -> Result<()> {
        validate_weights("pest.environment.weights", &self.environment.weights)?;
        validate_weights("pest.risk_map.weights", &self.risk_map.weights)?;
        validate_weights("pest.overall_weights", &self.overall_weights)?;

        for (_, bands) in self.stress.bands() {
            positive("pest.stress.medium_below", bands.medium_below)?;
        }
        for profile in &self.pests {
            for indicator in &profile.indicators {
                positive("pest.pests.threshold", indicator.threshold)?;
            }
        }
        let env = &self.environment;
        for (name, v) in [
            ("pest.environment.temperature.falloff", env.temperature.falloff),
            ("pest.environment.humidity.falloff", env.humidity.falloff),
            ("pest.environment.moisture.falloff", env.moisture.falloff),
            ("pest.environment.light_max", env.light_max),
            ("pest.risk_map.moisture_span", self.risk_map.moisture_span),
        ] {
            positive(name, v)?;
        }
        if self.medium_from >= self.high_from {
            return Err(Error::InvalidParameter {
                name: "pest.medium_from",
                value: format!("{} / {}", self.medium_from, self.high_from),
                reason: "medium cut must be below the high cut".into(),
            });
        }
        Ok(())
    }

    pub fn risk_level(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score_with(score, self.medium_from, self.high_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        PestParams::default().validate().unwrap();
        assert_eq!(PestParams::default().pests.len(), 5);
    }

    #[test]
    fn test_stress_bands() {
        let b = StressBands::new(0.3, 0.5);
        assert_eq!(b.level(0.2), RiskLevel::High);
        assert_eq!(b.level(0.3), RiskLevel::Medium);
        assert_eq!(b.level(0.5), RiskLevel::Low);
        assert_eq!(b.deficit(0.0), 1.0);
        assert_eq!(b.deficit(0.6), 0.0);
        assert!((b.deficit(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_favorable_range() {
        let r = FavorableRange::new(20.0, 30.0, 10.0);
        assert_eq!(r.favorability(25.0), 1.0);
        assert_eq!(r.favorability(20.0), 1.0);
        assert!((r.favorability(15.0) - 0.5).abs() < 1e-12);
        assert!((r.favorability(35.0) - 0.5).abs() < 1e-12);
        assert_eq!(r.favorability(45.0), 0.0);
    }

    #[test]
    fn test_light_and_moisture_favorability() {
        let env = EnvironmentParams::default();
        assert_eq!(env.light_favorability(0.0), 1.0);
        assert_eq!(env.light_favorability(0.4), 0.0);
        let rm = RiskMapParams::default();
        assert_eq!(rm.moisture_favorability(0.3), 1.0);
        assert_eq!(rm.moisture_favorability(-0.1), 0.0);
    }

    #[test]
    fn test_pest_indicator_risk() {
        let i = PestIndicator::new(SpectralIndex::Ndvi, 0.5);
        assert_eq!(i.risk(0.7), 0.0);
        assert!((i.risk(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let mut p = PestParams::default();
        p.pests[0].indicators[0].threshold = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_pests_from_json() {
        let p: PestParams = serde_json::from_str(
            r#"{"pests": [{"pest": "spider_mites", "indicators": [{"index": "ndre", "threshold": 0.3}]}]}"#,
        )
        .unwrap();
        assert_eq!(p.pests.len(), 1);
        assert_eq!(p.pests[0].pest, Pest::SpiderMites);
        p.validate().unwrap();
    }
}

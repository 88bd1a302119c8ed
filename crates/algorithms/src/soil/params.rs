//! Soil parameters, their optimal ranges and condition vocabulary

use crate::scoring::{validate_weights, Closed, ThresholdSet};
use cropsight_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A soil property measured by the ground sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilParameter {
    Moisture,
    Temperature,
    Ph,
    ElectricalConductivity,
}

impl SoilParameter {
    /// Weight order of the soil health score
    pub const ALL: [SoilParameter; 4] = [
        Self::Moisture,
        Self::Temperature,
        Self::Ph,
        Self::ElectricalConductivity,
    ];

    /// Name of the sensor series holding the readings
    pub fn series_name(self) -> &'static str {
        match self {
            Self::Moisture => "soil_moisture",
            Self::Temperature => "soil_temperature",
            Self::Ph => "ph",
            Self::ElectricalConductivity => "electrical_conductivity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Moisture => "m3/m3",
            Self::Temperature => "°C",
            Self::Ph => "pH",
            Self::ElectricalConductivity => "dS/m",
        }
    }
}

/// Five-step condition of a soil parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SoilCondition {
    ExtremelyLow,
    Low,
    Optimal,
    High,
    ExtremelyHigh,
}

impl SoilCondition {
    pub const ALL: [SoilCondition; 5] = [
        Self::ExtremelyLow,
        Self::Low,
        Self::Optimal,
        Self::High,
        Self::ExtremelyHigh,
    ];

    /// Condition of a five-band threshold level (0..=4)
    pub fn from_level(level: usize) -> Self {
        match level {
            0 => Self::ExtremelyLow,
            1 => Self::Low,
            2 => Self::Optimal,
            3 => Self::High,
            _ => Self::ExtremelyHigh,
        }
    }

    /// Three-level map code: optimal 3, next to optimal 2, extreme 1
    pub fn code(self) -> u8 {
        match self {
            Self::Optimal => 3,
            Self::Low | Self::High => 2,
            Self::ExtremelyLow | Self::ExtremelyHigh => 1,
        }
    }

    pub fn label(self, parameter: SoilParameter) -> &'static str {
        use SoilCondition::*;
        use SoilParameter::*;
        match (parameter, self) {
            (Moisture, ExtremelyLow) => "Very Dry",
            (Moisture, Low) => "Dry",
            (Moisture, High) => "Wet",
            (Moisture, ExtremelyHigh) => "Waterlogged",
            (Temperature, ExtremelyLow) => "Very Cold",
            (Temperature, Low) => "Cool",
            (Temperature, High) => "Warm",
            (Temperature, ExtremelyHigh) => "Very Hot",
            (Ph, ExtremelyLow) => "Strongly Acidic",
            (Ph, Low) => "Acidic",
            (Ph, High) => "Alkaline",
            (Ph, ExtremelyHigh) => "Strongly Alkaline",
            (ElectricalConductivity, ExtremelyLow) => "Very Low Fertility",
            (ElectricalConductivity, Low) => "Low Fertility",
            (ElectricalConductivity, High) => "Slightly Saline",
            (ElectricalConductivity, ExtremelyHigh) => "Saline",
            (_, Optimal) => "Optimal",
        }
    }

    pub fn recommendation(self, parameter: SoilParameter) -> &'static str {
        use SoilCondition::*;
        use SoilParameter::*;
        match (parameter, self) {
            (Moisture, ExtremelyLow) => "Irrigate immediately; soil moisture is critically low",
            (Moisture, Low) => "Increase irrigation frequency",
            (Moisture, High) => "Reduce irrigation and monitor drainage",
            (Moisture, ExtremelyHigh) => "Stop irrigation and improve field drainage",
            (Temperature, ExtremelyLow) => "Delay planting or use mulch to warm the soil",
            (Temperature, Low) => "Consider mulching to retain soil heat",
            (Temperature, High) => "Irrigate in the early morning to cool the soil",
            (Temperature, ExtremelyHigh) => "Apply shading or mulch to reduce soil temperature",
            (Ph, ExtremelyLow) => "Apply agricultural lime to raise pH",
            (Ph, Low) => "Apply a light lime dressing",
            (Ph, High) => "Apply elemental sulfur or acidifying fertilizer",
            (Ph, ExtremelyHigh) => "Apply sulfur and organic matter to lower pH",
            (ElectricalConductivity, ExtremelyLow) => "Apply balanced fertilizer; nutrient levels are very low",
            (ElectricalConductivity, Low) => "Consider additional fertilization",
            (ElectricalConductivity, High) => "Leach salts with extra irrigation",
            (ElectricalConductivity, ExtremelyHigh) => {
                "Leach salts and switch to salt-tolerant varieties"
            }
            (_, Optimal) => "Maintain current management",
        }
    }
}

/// Threshold set and scoring spread of one parameter.
///
/// The four cuts are `[extreme_low, optimal_low, optimal_high, extreme_high]`.
/// The built-in ranges use [`Closed::Inner`]: the optimal band is
/// `[optimal_low, optimal_high]` and only readings strictly beyond an
/// extreme cut are extreme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawParameterRange")]
pub struct ParameterRange {
    thresholds: ThresholdSet,
    max_distance: f64,
}

#[derive(Deserialize)]
struct RawParameterRange {
    thresholds: ThresholdSet,
    max_distance: f64,
}

impl TryFrom<RawParameterRange> for ParameterRange {
    type Error = Error;

    fn try_from(raw: RawParameterRange) -> Result<Self> {
        ParameterRange::new(raw.thresholds, raw.max_distance)
    }
}

impl ParameterRange {
    /// Needs exactly four cuts and a positive `max_distance`
    pub fn new(thresholds: ThresholdSet, max_distance: f64) -> Result<Self> {
        if thresholds.cuts().len() != 4 {
            return Err(Error::InvalidParameter {
                name: "thresholds",
                value: format!("{:?}", thresholds.cuts()),
                reason: "expected four cut points".into(),
            });
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(Error::InvalidParameter {
                name: "max_distance",
                value: max_distance.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        Ok(Self {
            thresholds,
            max_distance,
        })
    }

    fn preset(cuts: [f64; 4], max_distance: f64) -> Self {
        Self {
            thresholds: ThresholdSet::preset(cuts, Closed::Inner),
            max_distance,
        }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Distance from the optimal midpoint at which the score bottoms out
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Midpoint of the optimal band
    pub fn midpoint(&self) -> f64 {
        let c = self.thresholds.cuts();
        (c[1] + c[2]) / 2.0
    }

    pub fn extreme_low(&self) -> f64 {
        self.thresholds.cuts()[0]
    }

    pub fn extreme_high(&self) -> f64 {
        self.thresholds.cuts()[3]
    }

    pub fn condition(&self, value: f64) -> SoilCondition {
        SoilCondition::from_level(self.thresholds.level(value))
    }

    /// 1.0 inside the optimal band; otherwise decreasing with the distance
    /// from the midpoint, floored at 0.1
    pub fn score(&self, value: f64) -> f64 {
        if self.condition(value) == SoilCondition::Optimal {
            return 1.0;
        }
        (1.0 - (value - self.midpoint()).abs() / self.max_distance).clamp(0.1, 1.0)
    }
}

/// Ranges of the four soil parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilRanges {
    pub moisture: ParameterRange,
    pub temperature: ParameterRange,
    pub ph: ParameterRange,
    pub electrical_conductivity: ParameterRange,
}

impl Default for SoilRanges {
    fn default() -> Self {
        Self {
            moisture: ParameterRange::preset([0.10, 0.20, 0.40, 0.60], 0.30),
            temperature: ParameterRange::preset([5.0, 15.0, 25.0, 35.0], 15.0),
            ph: ParameterRange::preset([5.5, 6.0, 7.5, 8.0], 2.0),
            electrical_conductivity: ParameterRange::preset([0.2, 0.5, 2.0, 4.0], 2.75),
        }
    }
}

impl SoilRanges {
    pub fn get(&self, parameter: SoilParameter) -> &ParameterRange {
        match parameter {
            SoilParameter::Moisture => &self.moisture,
            SoilParameter::Temperature => &self.temperature,
            SoilParameter::Ph => &self.ph,
            SoilParameter::ElectricalConductivity => &self.electrical_conductivity,
        }
    }
}

/// Brightness/wetness rules of the spectral soil-type classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilTypeRules {
    /// Organic below this brightness (default: 0.12)
    pub organic_below: f64,
    /// Clay below this brightness (default: 0.25)
    pub clay_below: f64,
    /// Silt below this brightness; sand from here up (default: 0.35)
    pub silt_below: f64,
    /// Minimum wetness of clay and silt (default: -0.05)
    pub min_wetness: f64,
}

impl Default for SoilTypeRules {
    fn default() -> Self {
        Self {
            organic_below: 0.12,
            clay_below: 0.25,
            silt_below: 0.35,
            min_wetness: -0.05,
        }
    }
}

/// Parameters for soil condition scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilParams {
    pub ranges: SoilRanges,
    /// Weights of moisture, temperature, pH, EC (default: 0.30, 0.20, 0.30, 0.20)
    pub weights: [f64; 4],
    pub soil_types: SoilTypeRules,
    /// |z| above which a sensor sample is an outlier (default: 2.0)
    pub outlier_k: f64,
    /// Spectral moisture is `base + gain * NDWI` (default: 0.5, 0.3)
    pub spectral_moisture_base: f64,
    pub spectral_moisture_gain: f64,
    /// Spectral vs sensor moisture gap that triggers a warning (default: 0.2)
    pub moisture_discrepancy: f64,
    /// Score of a parameter whose series holds only gaps (default: 0.5)
    pub missing_score: f64,
}

impl Default for SoilParams {
    fn default() -> Self {
        Self {
            ranges: SoilRanges::default(),
            weights: [0.30, 0.20, 0.30, 0.20],
            soil_types: SoilTypeRules::default(),
            outlier_k: 2.0,
            spectral_moisture_base: 0.5,
            spectral_moisture_gain: 0.3,
            moisture_discrepancy: 0.2,
            missing_score: 0.5,
        }
    }
}

impl SoilParams {
    pub fn validate(&self) -> Result<()> {
        validate_weights("soil.weights", &self.weights)?;
        if !(0.0..=1.0).contains(&self.missing_score) {
            return Err(Error::InvalidParameter {
                name: "soil.missing_score",
                value: self.missing_score.to_string(),
                reason: "must lie in [0, 1]".into(),
            });
        }
        let r = &self.soil_types;
        if !(r.organic_below < r.clay_below && r.clay_below < r.silt_below) {
            return Err(Error::InvalidParameter {
                name: "soil.soil_types",
                value: format!("{} / {} / {}", r.organic_below, r.clay_below, r.silt_below),
                reason: "brightness cuts must be ascending".into(),
            });
        }
        Ok(())
    }
}

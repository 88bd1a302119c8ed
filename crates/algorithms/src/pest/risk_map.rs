//! Per-pixel pest risk map

use super::params::PestParams;
use crate::health::CropHealthResult;
use crate::imagery::{band_math_n, IndexMaps};
use crate::scoring::{HealthLevel, LevelCode, RiskLevel};
use cropsight_colormap::encode_levels;
use cropsight_core::raster::{Band, BandStack, Raster};
use cropsight_core::{Error, Result};
use ndarray::Zip;
use serde::Serialize;

/// Continuous and discretized pest risk of every pixel
#[derive(Debug, Clone, Serialize)]
pub struct RiskMap {
    pub mean: f64,
    /// Percentage (0-100) of pixels per level
    pub high_percentage: f64,
    pub medium_percentage: f64,
    pub low_percentage: f64,
    /// Risk in [0, 1]
    #[serde(skip)]
    pub values: Raster<f64>,
    /// Level codes (1 high, 2 medium, 3 low)
    #[serde(skip)]
    pub levels: Raster<u8>,
    #[serde(skip)]
    pub rgb: Vec<u8>,
}

impl RiskMap {
    pub fn percentage(&self, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::High => self.high_percentage,
            RiskLevel::Medium => self.medium_percentage,
            RiskLevel::Low => self.low_percentage,
        }
    }
}

/// Per-pixel mean of the blue, green and red bands
pub fn visible_map(stack: &BandStack) -> Result<Raster<f64>> {
    let blue = stack.band(Band::Blue)?;
    let green = stack.band(Band::Green)?;
    let red = stack.band(Band::Red)?;
    stack.to_raster((&blue + &green + &red) / 3.0)
}

/// Fuse stress deficit, spectral anomaly, moisture and light into a risk map.
///
/// `anomaly` and `visible` must match the index maps in shape.
pub fn risk_map(
    maps: &IndexMaps,
    anomaly: &Raster<f64>,
    visible: &Raster<f64>,
    params: &PestParams,
) -> Result<RiskMap> {
    let bands = params.stress.bands();
    let [w_deficit, w_anomaly, w_moisture, w_light] = params.risk_map.weights;
    let env = &params.environment;
    let rm = &params.risk_map;

    let inputs = [
        &maps.ndvi,
        &maps.gndvi,
        &maps.ndre,
        &maps.ndwi,
        anomaly,
        visible,
    ];
    let values = band_math_n(&inputs, |p| {
        let deficit = bands
            .iter()
            .zip(p)
            .map(|((_, b), &v)| b.deficit(v))
            .sum::<f64>()
            / bands.len() as f64;
        let risk = w_deficit * deficit
            + w_anomaly * p[4].clamp(0.0, 1.0)
            + w_moisture * rm.moisture_favorability(p[3])
            + w_light * env.light_favorability(p[5]);
        risk.clamp(0.0, 1.0)
    })?;

    let levels = values.derived(values.data().mapv(|v| params.risk_level(v).code()))?;
    let share = |level: RiskLevel| levels.percent_where(|c| c == level.code());

    Ok(RiskMap {
        mean: values.statistics().mean.unwrap_or(0.0),
        high_percentage: share(RiskLevel::High),
        medium_percentage: share(RiskLevel::Medium),
        low_percentage: share(RiskLevel::Low),
        rgb: encode_levels(&levels),
        values,
        levels,
    })
}

/// Percentage of pixels at high pest risk whose crop is not healthy
pub fn vulnerable_area(risk: &RiskMap, health: &CropHealthResult) -> Result<f64> {
    let (rows, cols) = risk.levels.shape();
    let (hr, hc) = health.health_map.shape();
    if (rows, cols) != (hr, hc) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: hr,
            ac: hc,
        });
    }

    let mut count = 0usize;
    Zip::from(risk.levels.data())
        .and(health.health_map.data())
        .for_each(|&r, &h| {
            if r == RiskLevel::High.code() && h != HealthLevel::Healthy.code() {
                count += 1;
            }
        });
    let total = (rows * cols).max(1) as f64;
    Ok(100.0 * count as f64 / total)
}

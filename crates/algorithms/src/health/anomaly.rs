//! Statistical and spatial anomalies of an index map

use crate::maybe_rayon::*;
use crate::statistics::{focal_mean_std, summarize};
use cropsight_core::raster::Raster;
use cropsight_core::{Error, Result};
use ndarray::Array2;
use serde::Serialize;

/// A 0/1 anomaly mask with its count and percentage of pixels
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyMask {
    #[serde(skip)]
    pub mask: Raster<u8>,
    pub count: usize,
    /// Percentage (0-100) of pixels flagged
    pub percentage: f64,
}

impl AnomalyMask {
    fn from_mask(mask: Raster<u8>) -> Self {
        let count = mask.count_where(|v| v == 1);
        let percentage = mask.percent_where(|v| v == 1);
        Self {
            mask,
            count,
            percentage,
        }
    }
}

/// Anomalies of the NDVI map
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyAnalysis {
    pub statistical: AnomalyMask,
    pub spatial: AnomalyMask,
}

/// Flag pixels farther than `k` standard deviations from the map mean.
///
/// A constant map has no anomalies.
pub fn statistical_anomalies(raster: &Raster<f64>, k: f64) -> Result<AnomalyMask> {
    let summary = summarize(raster.data().iter().copied());
    let (mean, std) = (summary.mean, summary.std);
    let flag = std > f64::EPSILON;

    let mask = raster
        .data()
        .mapv(|v| u8::from(flag && v.is_finite() && (v - mean).abs() > k * std));
    Ok(AnomalyMask::from_mask(raster.derived(mask)?))
}

/// Flag pixels farther than `k` local standard deviations from the mean of
/// their `(2 * radius + 1)`-square neighbourhood.
pub fn spatial_anomalies(raster: &Raster<f64>, radius: usize, k: f64) -> Result<AnomalyMask> {
    let moments = focal_mean_std(raster, radius)?;
    let (rows, cols) = raster.shape();
    let data = raster.data();
    let local_mean = moments.mean.data();
    let local_std = moments.std.data();

    let flags: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let v = data[(row, col)];
                    let s = local_std[(row, col)];
                    u8::from(
                        v.is_finite()
                            && s > f64::EPSILON
                            && (v - local_mean[(row, col)]).abs() > k * s,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), flags).map_err(|e| Error::Other(e.to_string()))?;
    Ok(AnomalyMask::from_mask(raster.derived(array)?))
}

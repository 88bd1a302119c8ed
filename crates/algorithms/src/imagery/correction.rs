//! Radiometric and atmospheric correction of a band stack
//!
//! Radiometric correction turns raw sensor counts into reflectance in
//! [0, 1]: counts are rescaled by the sensor's full scale, each band is
//! clipped at a high percentile to suppress specular outliers, and a linear
//! gain/offset calibration is applied.
//!
//! Atmospheric correction uses dark-object subtraction: the darkest pixels
//! of a band are assumed to reflect nothing, so their mean is haze and is
//! subtracted from the whole band.
//!
//! The corrected stack is then denoised before the indices are derived.

use crate::imagery::denoise::{denoise, DenoiseParams};
use crate::imagery::indices::{compute_indices, IndexMaps, IndexParams};
use crate::statistics::percentile;
use cropsight_core::raster::BandStack;
use cropsight_core::{Error, Result};
use ndarray::{ArrayViewMut2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Correction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionParams {
    /// Sensor full scale used when the input holds raw counts (default: 65535)
    pub full_scale: f64,
    /// Per-band upper clip percentile (default: 99)
    pub clip_percentile: f64,
    /// Calibration gain (default: 1.0)
    pub gain: f64,
    /// Calibration offset (default: 0.0)
    pub offset: f64,
    /// Percentile below which pixels count as dark objects (default: 1)
    pub dark_percentile: f64,
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self {
            full_scale: 65535.0,
            clip_percentile: 99.0,
            gain: 1.0,
            offset: 0.0,
            dark_percentile: 1.0,
        }
    }
}

impl CorrectionParams {
    fn validate(&self) -> Result<()> {
        if !(self.full_scale.is_finite() && self.full_scale > 0.0) {
            return Err(Error::InvalidParameter {
                name: "full_scale",
                value: self.full_scale.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        for (name, p) in [
            ("clip_percentile", self.clip_percentile),
            ("dark_percentile", self.dark_percentile),
        ] {
            if !(0.0..=100.0).contains(&p) {
                return Err(Error::InvalidParameter {
                    name,
                    value: p.to_string(),
                    reason: "percentile must be within [0, 100]".into(),
                });
            }
        }
        if !(self.gain.is_finite() && self.offset.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "gain",
                value: format!("{} / {}", self.gain, self.offset),
                reason: "gain and offset must be finite".into(),
            });
        }
        Ok(())
    }
}

/// Correction, noise reduction and index parameters of the spectral stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralParams {
    pub correction: CorrectionParams,
    pub denoise: DenoiseParams,
    pub indices: IndexParams,
}

impl SpectralParams {
    /// Same parameters with the lighter noise reduction used on
    /// down-sampled input
    pub fn fast_path(&self) -> Self {
        Self {
            denoise: self.denoise.lighter(),
            ..self.clone()
        }
    }
}

/// Output of the spectral stage
#[derive(Debug, Clone)]
pub struct SpectralProducts {
    /// Reflectance stack after correction and noise reduction
    pub corrected: BandStack,
    pub indices: IndexMaps,
}

/// Sorted finite values of one band
fn sorted_band(band: &ArrayViewMut2<'_, f64>) -> Vec<f64> {
    let mut values: Vec<f64> = band.iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Convert raw counts or reflectances to calibrated reflectance in [0, 1].
///
/// The stack is treated as raw counts when any finite value exceeds 1.
/// Non-finite samples become 0.
pub fn radiometric_correction(raw: &BandStack, params: &CorrectionParams) -> Result<BandStack> {
    params.validate()?;

    let mut data = raw.data().clone();
    let is_raw = data.iter().any(|v| v.is_finite() && *v > 1.0);
    if is_raw {
        debug!(full_scale = params.full_scale, "rescaling raw counts");
        data.mapv_inplace(|v| v / params.full_scale);
    }

    for mut band in data.axis_iter_mut(Axis(2)) {
        let sorted = sorted_band(&band);
        let clip = percentile(&sorted, params.clip_percentile);
        band.mapv_inplace(|v| {
            if v.is_finite() {
                (v.min(clip) * params.gain + params.offset).clamp(0.0, 1.0)
            } else {
                0.0
            }
        });
    }

    raw.with_data(data)
}

/// Dark-object subtraction.
///
/// For every band the mean of the values at or below the dark percentile
/// is subtracted, and results are floored at 0.
pub fn atmospheric_correction(stack: &BandStack, params: &CorrectionParams) -> Result<BandStack> {
    params.validate()?;

    let mut data = stack.data().clone();
    for (b, mut band) in data.axis_iter_mut(Axis(2)).enumerate() {
        let sorted = sorted_band(&band);
        let cut = percentile(&sorted, params.dark_percentile);
        let dark = &sorted[..sorted.partition_point(|&v| v <= cut)];
        // Mean taken as an offset from the darkest sample, so a run of
        // identical samples subtracts to exactly zero
        let dark_value = match dark.first() {
            None => 0.0,
            Some(&lo) => {
                let spread = dark.iter().map(|v| v - lo).sum::<f64>() / dark.len() as f64;
                (lo + spread).min(cut)
            }
        };
        debug!(band = b, dark_value, "dark object");
        band.mapv_inplace(|v| if v.is_finite() { (v - dark_value).max(0.0) } else { 0.0 });
    }

    stack.with_data(data)
}

/// Correct and denoise a raw stack, then derive the eight index maps from it
pub fn correct_and_index(raw: &BandStack, params: &SpectralParams) -> Result<SpectralProducts> {
    let calibrated = radiometric_correction(raw, &params.correction)?;
    let dehazed = atmospheric_correction(&calibrated, &params.correction)?;
    let corrected = denoise(&dehazed, &params.denoise)?;
    let indices = compute_indices(&corrected, &params.indices)?;
    Ok(SpectralProducts { corrected, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn ramp_stack(rows: usize, cols: usize, bands: usize, scale: f64) -> BandStack {
        let mut data = Array3::zeros((rows, cols, bands));
        for ((r, c, b), v) in data.indexed_iter_mut() {
            *v = scale * ((r * cols + c) as f64 + b as f64) / (rows * cols + bands) as f64;
        }
        BandStack::from_array(data).unwrap()
    }

    #[test]
    fn test_raw_counts_are_rescaled() {
        let raw = BandStack::uniform(4, 4, &[13107.0; 8]).unwrap();
        let out = radiometric_correction(&raw, &CorrectionParams::default()).unwrap();
        // 13107 / 65535 = 0.2
        for &v in out.data().iter() {
            assert!((v - 0.2).abs() < 1e-12, "Expected 0.2, got {}", v);
        }
    }

    #[test]
    fn test_reflectance_is_not_rescaled() {
        let s = BandStack::uniform(4, 4, &[0.4; 8]).unwrap();
        let out = radiometric_correction(&s, &CorrectionParams::default()).unwrap();
        assert!(out.data().iter().all(|&v| (v - 0.4).abs() < 1e-12));
    }

    #[test]
    fn test_clip_at_percentile() {
        let mut data = Array3::from_elem((10, 10, 1), 0.1);
        data[[0, 0, 0]] = 0.95;
        let s = BandStack::from_array(data).unwrap();
        let out = radiometric_correction(&s, &CorrectionParams::default()).unwrap();
        // The single bright pixel lies above the 99th percentile
        assert!(out.data()[[0, 0, 0]] < 0.95);
        assert!((out.data()[[5, 5, 0]] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_gain_offset_and_clamp() {
        let s = BandStack::uniform(3, 3, &[0.5, 0.9]).unwrap();
        let params = CorrectionParams {
            gain: 2.0,
            offset: -0.1,
            ..Default::default()
        };
        let out = radiometric_correction(&s, &params).unwrap();
        assert!((out.data()[[1, 1, 0]] - 0.9).abs() < 1e-12);
        assert_eq!(out.data()[[1, 1, 1]], 1.0);
    }

    #[test]
    fn test_non_finite_become_zero() {
        let mut data = Array3::from_elem((3, 3, 2), 0.3);
        data[[1, 1, 0]] = f64::NAN;
        data[[2, 2, 1]] = f64::INFINITY;
        let s = BandStack::from_array(data).unwrap();
        let out = radiometric_correction(&s, &CorrectionParams::default()).unwrap();
        assert_eq!(out.data()[[1, 1, 0]], 0.0);
        assert_eq!(out.data()[[2, 2, 1]], 0.0);
    }

    #[test]
    fn test_dark_object_subtraction() {
        let s = ramp_stack(10, 10, 8, 0.5);
        let out = atmospheric_correction(&s, &CorrectionParams::default()).unwrap();
        for band in out.data().axis_iter(Axis(2)) {
            let min = band.iter().copied().fold(f64::INFINITY, f64::min);
            assert!(min.abs() < 1e-12, "darkest pixel should be 0, got {}", min);
            assert!(band.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_uniform_stack_subtracts_to_zero() {
        for level in [0.3, 0.1, 0.7, 1.0 / 3.0] {
            let s = BandStack::uniform(4, 4, &[level; 8]).unwrap();
            let out = atmospheric_correction(&s, &CorrectionParams::default()).unwrap();
            assert!(out.data().iter().all(|&v| v == 0.0), "residual at {}", level);
        }
    }

    #[test]
    fn test_correct_and_index_shapes() {
        let raw = ramp_stack(6, 7, 8, 40000.0);
        let products = correct_and_index(&raw, &SpectralParams::default()).unwrap();
        assert_eq!(products.corrected.shape(), (6, 7));
        assert_eq!(products.indices.shape(), (6, 7));
        assert!(products.corrected.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_denoise_follows_correction() {
        let raw = ramp_stack(6, 6, 8, 40000.0);
        let params = SpectralParams::default();
        let calibrated = radiometric_correction(&raw, &params.correction).unwrap();
        let dehazed = atmospheric_correction(&calibrated, &params.correction).unwrap();
        let expected = denoise(&dehazed, &params.denoise).unwrap();
        let products = correct_and_index(&raw, &params).unwrap();
        assert_eq!(products.corrected.data(), expected.data());

        let unfiltered = SpectralParams {
            denoise: DenoiseParams::off(),
            ..Default::default()
        };
        let products = correct_and_index(&raw, &unfiltered).unwrap();
        assert_eq!(products.corrected.data(), dehazed.data());
    }

    #[test]
    fn test_fast_path_keeps_median_only() {
        let params = SpectralParams::default().fast_path();
        assert_eq!(params.denoise.gaussian_sigma, 0.0);
        assert_eq!(params.denoise.median_radius, 1);
        assert_eq!(params.correction, CorrectionParams::default());
    }

    #[test]
    fn test_correct_and_index_band_count() {
        let raw = ramp_stack(4, 4, 5, 1.0);
        assert!(matches!(
            correct_and_index(&raw, &SpectralParams::default()),
            Err(Error::BandCountMismatch { expected: 8, actual: 5 })
        ));
    }

    #[test]
    fn test_invalid_params() {
        let s = BandStack::uniform(2, 2, &[0.1; 8]).unwrap();
        let params = CorrectionParams {
            full_scale: 0.0,
            ..Default::default()
        };
        assert!(radiometric_correction(&s, &params).is_err());
        let params = CorrectionParams {
            dark_percentile: 120.0,
            ..Default::default()
        };
        assert!(atmospheric_correction(&s, &params).is_err());
    }
}

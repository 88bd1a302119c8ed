//! Noise reduction of a corrected band stack
//!
//! Each band is smoothed with a normalized Gaussian kernel and then passed
//! through a focal median, which removes isolated speckle that the Gaussian
//! only spreads out. Windows are truncated at the border and the kernel is
//! renormalized over the neighbours that exist.

use crate::maybe_rayon::*;
use crate::statistics::focal_median;
use cropsight_core::raster::BandStack;
use cropsight_core::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Noise reduction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseParams {
    /// Gaussian standard deviation in pixels; 0 skips the Gaussian pass
    /// (default: 1.0)
    pub gaussian_sigma: f64,
    /// Median window radius; 0 skips the median pass (default: 1, a 3x3 window)
    pub median_radius: usize,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            gaussian_sigma: 1.0,
            median_radius: 1,
        }
    }
}

impl DenoiseParams {
    /// No filtering at all
    pub fn off() -> Self {
        Self {
            gaussian_sigma: 0.0,
            median_radius: 0,
        }
    }

    /// Median pass only, for down-sampled input that block averaging has
    /// already smoothed
    pub fn lighter(&self) -> Self {
        Self {
            gaussian_sigma: 0.0,
            ..*self
        }
    }

    pub fn is_off(&self) -> bool {
        self.gaussian_sigma == 0.0 && self.median_radius == 0
    }

    fn validate(&self) -> Result<()> {
        if !(self.gaussian_sigma.is_finite() && self.gaussian_sigma >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "gaussian_sigma",
                value: self.gaussian_sigma.to_string(),
                reason: "must be a non-negative number".into(),
            });
        }
        Ok(())
    }
}

/// Gaussian smoothing of a 2-D array.
///
/// The kernel spans `ceil(3 * sigma)` pixels each way. Non-finite
/// neighbours are skipped; a cell with none left becomes 0.
pub fn gaussian_filter(data: ArrayView2<'_, f64>, sigma: f64) -> Result<Array2<f64>> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::InvalidParameter {
            name: "sigma",
            value: sigma.to_string(),
            reason: "must be a positive number".into(),
        });
    }

    let radius = (3.0 * sigma).ceil() as usize;
    let r = radius as isize;
    let size = 2 * radius + 1;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel = vec![0.0_f64; size * size];
    for dr in -r..=r {
        for dc in -r..=r {
            let idx = ((dr + r) as usize) * size + (dc + r) as usize;
            kernel[idx] = (-((dr * dr + dc * dc) as f64) / two_sigma_sq).exp();
        }
    }

    let (rows, cols) = data.dim();
    let smoothed: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut out = Vec::with_capacity(cols);
            for col in 0..cols {
                // Weighted offsets from the centre, so a flat window
                // reproduces the centre exactly
                let centre = data[(row, col)];
                let base = if centre.is_finite() { centre } else { 0.0 };
                let mut sum = 0.0;
                let mut wsum = 0.0;
                for dr in -r..=r {
                    let nr = row as isize + dr;
                    if nr < 0 || nr as usize >= rows {
                        continue;
                    }
                    for dc in -r..=r {
                        let nc = col as isize + dc;
                        if nc < 0 || nc as usize >= cols {
                            continue;
                        }
                        let v = data[(nr as usize, nc as usize)];
                        if !v.is_finite() {
                            continue;
                        }
                        let w = kernel[((dr + r) as usize) * size + (dc + r) as usize];
                        sum += w * (v - base);
                        wsum += w;
                    }
                }
                out.push(if wsum > 0.0 { base + sum / wsum } else { 0.0 });
            }
            out
        })
        .collect();

    Array2::from_shape_vec((rows, cols), smoothed).map_err(|e| Error::Other(e.to_string()))
}

/// Gaussian then median filtering of every band
pub fn denoise(stack: &BandStack, params: &DenoiseParams) -> Result<BandStack> {
    params.validate()?;
    if params.is_off() {
        return Ok(stack.clone());
    }
    debug!(
        sigma = params.gaussian_sigma,
        median_radius = params.median_radius,
        "noise reduction"
    );

    let mut data = stack.data().clone();
    for mut band in data.axis_iter_mut(Axis(2)) {
        let mut filtered = band.to_owned();
        if params.gaussian_sigma > 0.0 {
            filtered = gaussian_filter(filtered.view(), params.gaussian_sigma)?;
        }
        if params.median_radius > 0 {
            filtered = focal_median(filtered.view(), params.median_radius)?;
        }
        band.assign(&filtered);
    }

    stack.with_data(data)
}

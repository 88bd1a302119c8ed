//! Band math over index maps
//!
//! Element-wise functions of one or several same-shaped rasters. These are
//! the building blocks of the per-pixel fusions (moisture estimates, risk
//! maps). Non-finite results are replaced by 0 so that every derived map
//! stays free of NaN and infinities.

use crate::maybe_rayon::*;
use cropsight_core::raster::Raster;
use cropsight_core::{Error, Result};
use ndarray::Array2;

/// Apply a unary function to every cell in a raster.
///
/// # Example
/// ```ignore
/// let moisture = band_math(&ndwi, |v| (0.5 + 0.3 * v).clamp(0.0, 1.0))?;
/// ```
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    band_math_n(&[raster], |v| f(v[0]))
}

/// Apply a function of several co-located cells to every pixel.
///
/// All rasters must share one shape; the output keeps the georeference
/// of the first.
pub fn band_math_n<F>(rasters: &[&Raster<f64>], f: F) -> Result<Raster<f64>>
where
    F: Fn(&[f64]) -> f64 + Sync + Send,
{
    let first = rasters.first().ok_or(Error::InvalidParameter {
        name: "rasters",
        value: "0".into(),
        reason: "band math needs at least one input raster".into(),
    })?;
    for r in &rasters[1..] {
        first.check_same_shape(r)?;
    }

    let (rows, cols) = first.shape();
    let n = rasters.len();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut pixel = vec![0.0; n];
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                for (slot, r) in pixel.iter_mut().zip(rasters) {
                    *slot = r.data()[(row, col)];
                }
                row_data.push(sanitize(f(&pixel)));
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    first.derived(array)
}

/// Replace NaN and infinities by 0
#[inline]
pub fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_math_unary() {
        let input = Raster::filled(5, 5, 0.2);
        let result = band_math(&input, |v| 0.5 + 0.3 * v).unwrap();
        assert!((result.get(2, 2).unwrap() - 0.56).abs() < 1e-12);
    }

    #[test]
    fn test_band_math_n_weighted() {
        let a = Raster::filled(3, 3, 1.0);
        let b = Raster::filled(3, 3, 0.5);
        let result = band_math_n(&[&a, &b], |v| 0.4 * v[0] + 0.6 * v[1]).unwrap();
        assert!((result.get(1, 1).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_results_become_zero() {
        let input = Raster::filled(2, 2, 0.0);
        let result = band_math(&input, |v| 1.0 / v).unwrap();
        assert!(result.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Raster::filled(5, 5, 1.0);
        let b = Raster::filled(5, 10, 1.0);
        assert!(band_math_n(&[&a, &b], |v| v[0] + v[1]).is_err());
        assert!(band_math_n(&[], |_| 0.0).is_err());
    }
}

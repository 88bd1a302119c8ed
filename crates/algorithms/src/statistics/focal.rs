//! Focal (moving window) statistics: mean, standard deviation, median
//!
//! Each output cell summarizes the square window of side `2*radius + 1`
//! centred on it. Windows are truncated at the raster border, so edge
//! cells are summarized over the neighbours that exist.

use crate::maybe_rayon::*;
use cropsight_core::raster::Raster;
use cropsight_core::{Error, Result};
use ndarray::{Array2, ArrayView2};

/// Local mean and standard deviation rasters
#[derive(Debug, Clone)]
pub struct FocalMoments {
    pub mean: Raster<f64>,
    /// Population standard deviation of the window
    pub std: Raster<f64>,
}

/// Compute the focal mean and standard deviation of a raster.
///
/// Non-finite neighbours are skipped; a cell with no finite neighbours
/// gets mean 0 and standard deviation 0.
pub fn focal_mean_std(raster: &Raster<f64>, radius: usize) -> Result<FocalMoments> {
    if radius == 0 {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: radius.to_string(),
            reason: "focal radius must be > 0".into(),
        });
    }

    let (rows, cols) = raster.shape();
    let data = raster.data();

    let moments: Vec<(f64, f64)> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let r0 = row.saturating_sub(radius);
            let r1 = (row + radius).min(rows - 1);
            let mut out = Vec::with_capacity(cols);

            for col in 0..cols {
                let c0 = col.saturating_sub(radius);
                let c1 = (col + radius).min(cols - 1);

                let mut sum = 0.0;
                let mut n = 0usize;
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        let v = data[(r, c)];
                        if v.is_finite() {
                            sum += v;
                            n += 1;
                        }
                    }
                }
                if n == 0 {
                    out.push((0.0, 0.0));
                    continue;
                }

                let m = sum / n as f64;
                let mut sq = 0.0;
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        let v = data[(r, c)];
                        if v.is_finite() {
                            sq += (v - m) * (v - m);
                        }
                    }
                }
                out.push((m, (sq / n as f64).sqrt()));
            }
            out
        })
        .collect();

    let (means, stds): (Vec<f64>, Vec<f64>) = moments.into_iter().unzip();
    let to_array = |v: Vec<f64>| {
        Array2::from_shape_vec((rows, cols), v).map_err(|e| Error::Other(e.to_string()))
    };

    Ok(FocalMoments {
        mean: raster.derived(to_array(means)?)?,
        std: raster.derived(to_array(stds)?)?,
    })
}

/// Focal median of a 2-D array over a `(2*radius + 1)` square window.
///
/// Non-finite neighbours are skipped; an even count takes the mean of the
/// two middle values. A cell with no finite neighbours becomes 0.
pub fn focal_median(data: ArrayView2<'_, f64>, radius: usize) -> Result<Array2<f64>> {
    if radius == 0 {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: radius.to_string(),
            reason: "focal radius must be > 0".into(),
        });
    }

    let (rows, cols) = data.dim();
    let medians: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let r0 = row.saturating_sub(radius);
            let r1 = (row + radius).min(rows - 1);
            let mut window = Vec::with_capacity((2 * radius + 1).pow(2));
            let mut out = Vec::with_capacity(cols);

            for col in 0..cols {
                let c0 = col.saturating_sub(radius);
                let c1 = (col + radius).min(cols - 1);
                window.clear();
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        let v = data[(r, c)];
                        if v.is_finite() {
                            window.push(v);
                        }
                    }
                }
                window.sort_by(|a, b| a.total_cmp(b));
                let n = window.len();
                out.push(match n {
                    0 => 0.0,
                    _ if n % 2 == 0 => (window[n / 2 - 1] + window[n / 2]) / 2.0,
                    _ => window[n / 2],
                });
            }
            out
        })
        .collect();

    Array2::from_shape_vec((rows, cols), medians).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_raster(size: usize) -> Raster<f64> {
        let mut r = Raster::new(size, size);
        for row in 0..size {
            for col in 0..size {
                r.set(row, col, (row * size + col) as f64).unwrap();
            }
        }
        r
    }

    #[test]
    fn test_focal_uniform() {
        let r = Raster::filled(10, 10, 5.0);
        let m = focal_mean_std(&r, 2).unwrap();
        let mean = m.mean.get(5, 5).unwrap();
        let std = m.std.get(5, 5).unwrap();
        assert!((mean - 5.0).abs() < 1e-10, "Mean of uniform should be 5.0, got {}", mean);
        assert!(std.abs() < 1e-10, "StdDev of uniform should be 0, got {}", std);
    }

    #[test]
    fn test_focal_interior_mean() {
        let r = gradient_raster(10);
        let m = focal_mean_std(&r, 1).unwrap();
        // 3x3 window around (5,5) is symmetric around 55
        assert!((m.mean.get(5, 5).unwrap() - 55.0).abs() < 1e-10);
    }

    #[test]
    fn test_focal_corner_truncated() {
        let r = gradient_raster(10);
        let m = focal_mean_std(&r, 1).unwrap();
        // Corner window: 0, 1, 10, 11
        assert!((m.mean.get(0, 0).unwrap() - 5.5).abs() < 1e-10);
    }

    #[test]
    fn test_focal_zero_radius() {
        let r = Raster::filled(3, 3, 1.0);
        assert!(focal_mean_std(&r, 0).is_err());
        assert!(focal_median(r.view(), 0).is_err());
    }

    #[test]
    fn test_focal_median_interior() {
        let r = gradient_raster(10);
        let m = focal_median(r.view(), 1).unwrap();
        assert!((m[(5, 5)] - 55.0).abs() < 1e-10);
    }

    #[test]
    fn test_focal_median_removes_spike() {
        let mut r = Raster::filled(7, 7, 0.2);
        r.set(3, 3, 1.0).unwrap();
        let m = focal_median(r.view(), 1).unwrap();
        assert!(m.iter().all(|&v| v == 0.2));
    }

    #[test]
    fn test_focal_median_corner_even_count() {
        let r = gradient_raster(10);
        let m = focal_median(r.view(), 1).unwrap();
        // Corner window 0, 1, 10, 11
        assert!((m[(0, 0)] - 5.5).abs() < 1e-10);
    }
}

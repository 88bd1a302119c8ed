//! Spectral-angle anomaly
//!
//! Each pixel's spectrum is compared against a reference spectrum by the
//! cosine of the angle between the two vectors. The anomaly is
//! `1 - cos(pixel, reference)`, clamped to [0, 1]: identical spectral
//! shapes score 0 whatever their brightness.

use cropsight_core::raster::{BandStack, Raster};
use cropsight_core::{Error, Result};
use ndarray::{Array1, ArrayView1, Axis};

/// Anomaly of every pixel against the whole-image mean spectrum
pub fn spectral_angle_anomaly(stack: &BandStack) -> Result<Raster<f64>> {
    let reference = stack.mean_spectrum();
    spectral_angle_anomaly_against(stack, reference.view())
}

/// Anomaly of every pixel against an explicit reference spectrum.
///
/// Pixels with a zero spectrum, or a zero reference, score 0.
pub fn spectral_angle_anomaly_against(
    stack: &BandStack,
    reference: ArrayView1<'_, f64>,
) -> Result<Raster<f64>> {
    if reference.len() != stack.band_count() {
        return Err(Error::BandCountMismatch {
            expected: stack.band_count(),
            actual: reference.len(),
        });
    }

    let (rows, cols) = stack.shape();
    let matrix = stack.pixel_matrix()?;
    let ref_norm = reference.dot(&reference).sqrt();

    // One matrix-vector product for every pixel's dot with the reference
    let dots: Array1<f64> = matrix.dot(&reference);
    let norms = matrix.map_axis(Axis(1), |p| p.dot(&p).sqrt());

    let anomaly: Array1<f64> = ndarray::Zip::from(&dots)
        .and(&norms)
        .map_collect(|&dot, &norm| {
            let denom = norm * ref_norm;
            if denom <= f64::EPSILON || !denom.is_finite() {
                return 0.0;
            }
            let cos = (dot / denom).clamp(-1.0, 1.0);
            (1.0 - cos).clamp(0.0, 1.0)
        });

    let array = anomaly
        .into_shape_with_order((rows, cols))
        .map_err(|e| Error::Other(e.to_string()))?;
    stack.to_raster(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_uniform_stack_has_no_anomaly() {
        let s = BandStack::uniform(6, 6, &[0.05, 0.1, 0.2, 0.4, 0.2, 0.3, 0.3, 0.2]).unwrap();
        let a = spectral_angle_anomaly(&s).unwrap();
        assert_eq!(a.shape(), (6, 6));
        assert!(a.data().iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_brightness_does_not_matter() {
        let mut data = Array3::zeros((1, 2, 3));
        data.slice_mut(ndarray::s![0, 0, ..]).assign(&array![0.1, 0.2, 0.3]);
        data.slice_mut(ndarray::s![0, 1, ..]).assign(&array![0.2, 0.4, 0.6]);
        let s = BandStack::from_array(data).unwrap();
        let a = spectral_angle_anomaly(&s).unwrap();
        assert!(a.data().iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn test_orthogonal_spectrum_scores_one() {
        let s = BandStack::uniform(2, 2, &[1.0, 0.0]).unwrap();
        let a = spectral_angle_anomaly_against(&s, array![0.0, 1.0].view()).unwrap();
        assert!(a.data().iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_zero_pixels_score_zero() {
        let s = BandStack::uniform(3, 3, &[0.0; 8]).unwrap();
        let a = spectral_angle_anomaly(&s).unwrap();
        assert!(a.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_values_clamped() {
        let s = BandStack::uniform(2, 2, &[1.0, 0.0]).unwrap();
        // Opposite direction: 1 - (-1) = 2, clamped to 1
        let a = spectral_angle_anomaly_against(&s, array![-1.0, 0.0].view()).unwrap();
        assert!(a.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_reference_length_mismatch() {
        let s = BandStack::uniform(2, 2, &[0.1, 0.2, 0.3]).unwrap();
        assert!(spectral_angle_anomaly_against(&s, array![0.1, 0.2].view()).is_err());
    }
}

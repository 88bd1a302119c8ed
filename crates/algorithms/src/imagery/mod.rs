//! Spectral imagery processing
//!
//! - **correction**: radiometric calibration and dark-object subtraction
//! - **denoise**: Gaussian and median noise reduction
//! - **indices**: NDVI, GNDVI, NDRE, SAVI, EVI, NDWI, MSR, CI
//! - **spectral_angle**: per-pixel spectral-angle anomaly against a reference
//! - **band_math**: element-wise functions of co-located rasters

mod band_math;
mod correction;
mod denoise;
mod indices;
mod spectral_angle;

pub use band_math::{band_math, band_math_n, sanitize};
pub use correction::{
    atmospheric_correction, correct_and_index, radiometric_correction, CorrectionParams,
    SpectralParams, SpectralProducts,
};
pub use denoise::{denoise, gaussian_filter, DenoiseParams};
pub use indices::{
    compute_indices, index_map, normalized_difference, EviParams, IndexMaps, IndexParams,
    SpectralIndex,
};
pub use spectral_angle::{spectral_angle_anomaly, spectral_angle_anomaly_against};

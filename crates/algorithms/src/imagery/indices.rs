//! Spectral vegetation and water indices
//!
//! All indices are computed from a corrected [`BandStack`] with the fixed
//! band order Blue, Green, Red, NIR, RedEdge1, RedEdge2, RedEdge3, SWIR1.
//! A small epsilon keeps every denominator away from zero, and any
//! remaining NaN or infinity is replaced by 0.

use crate::imagery::band_math::sanitize;
use crate::maybe_rayon::*;
use cropsight_core::raster::{Band, BandStack, Raster};
use cropsight_core::{Error, Result};
use ndarray::{Array2, ArrayView3};
use serde::{Deserialize, Serialize};

/// Enumeration of the derived indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Green Normalized Difference Vegetation Index
    Gndvi,
    /// Normalized Difference Red Edge Index
    Ndre,
    /// Soil Adjusted Vegetation Index
    Savi,
    /// Enhanced Vegetation Index
    Evi,
    /// Normalized Difference Water Index (McFeeters)
    Ndwi,
    /// Modified Simple Ratio
    Msr,
    /// Red Edge Chlorophyll Index
    Ci,
}

impl SpectralIndex {
    pub const ALL: [SpectralIndex; 8] = [
        Self::Ndvi,
        Self::Gndvi,
        Self::Ndre,
        Self::Savi,
        Self::Evi,
        Self::Ndwi,
        Self::Msr,
        Self::Ci,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ndvi => "ndvi",
            Self::Gndvi => "gndvi",
            Self::Ndre => "ndre",
            Self::Savi => "savi",
            Self::Evi => "evi",
            Self::Ndwi => "ndwi",
            Self::Msr => "msr",
            Self::Ci => "ci",
        }
    }

    /// Bands the formula reads
    pub fn bands(self) -> &'static [Band] {
        match self {
            Self::Ndvi | Self::Savi | Self::Msr => &[Band::Nir, Band::Red],
            Self::Gndvi | Self::Ndwi => &[Band::Nir, Band::Green],
            Self::Ndre | Self::Ci => &[Band::Nir, Band::RedEdge1],
            Self::Evi => &[Band::Nir, Band::Red, Band::Blue],
        }
    }
}

/// Parameters for EVI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EviParams {
    /// Gain factor (default: 2.5)
    pub g: f64,
    /// Aerosol coefficient for red band (default: 6.0)
    pub c1: f64,
    /// Aerosol coefficient for blue band (default: 7.5)
    pub c2: f64,
    /// Canopy background adjustment (default: 1.0)
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            g: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Index computation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Added to denominators (default: 1e-10)
    pub epsilon: f64,
    /// SAVI soil brightness correction factor (default: 0.5)
    pub savi_l: f64,
    pub evi: EviParams,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            savi_l: 0.5,
            evi: EviParams::default(),
        }
    }
}

/// The eight index maps of one analysis
#[derive(Debug, Clone)]
pub struct IndexMaps {
    pub ndvi: Raster<f64>,
    pub gndvi: Raster<f64>,
    pub ndre: Raster<f64>,
    pub savi: Raster<f64>,
    pub evi: Raster<f64>,
    pub ndwi: Raster<f64>,
    pub msr: Raster<f64>,
    pub ci: Raster<f64>,
}

impl IndexMaps {
    pub fn get(&self, index: SpectralIndex) -> &Raster<f64> {
        match index {
            SpectralIndex::Ndvi => &self.ndvi,
            SpectralIndex::Gndvi => &self.gndvi,
            SpectralIndex::Ndre => &self.ndre,
            SpectralIndex::Savi => &self.savi,
            SpectralIndex::Evi => &self.evi,
            SpectralIndex::Ndwi => &self.ndwi,
            SpectralIndex::Msr => &self.msr,
            SpectralIndex::Ci => &self.ci,
        }
    }

    /// Spatial dimensions shared by every map
    pub fn shape(&self) -> (usize, usize) {
        self.ndvi.shape()
    }

    /// Mean of one index map
    pub fn mean(&self, index: SpectralIndex) -> f64 {
        self.get(index).statistics().mean.unwrap_or(0.0)
    }
}

/// Reflectances of one pixel
#[derive(Debug, Clone, Copy)]
struct Pixel {
    blue: f64,
    green: f64,
    red: f64,
    nir: f64,
    red_edge: f64,
}

impl Pixel {
    fn read(data: &ArrayView3<'_, f64>, row: usize, col: usize) -> Self {
        // Missing trailing bands read as 0; callers check the band count first.
        let band = |b: Band| data.get([row, col, b.index()]).copied().unwrap_or(0.0);
        Self {
            blue: band(Band::Blue),
            green: band(Band::Green),
            red: band(Band::Red),
            nir: band(Band::Nir),
            red_edge: band(Band::RedEdge1),
        }
    }
}

/// `(a - b) / (a + b + eps)`
#[inline]
pub fn normalized_difference(a: f64, b: f64, eps: f64) -> f64 {
    (a - b) / (a + b + eps)
}

fn evaluate(index: SpectralIndex, p: &Pixel, params: &IndexParams) -> f64 {
    let eps = params.epsilon;
    match index {
        SpectralIndex::Ndvi => normalized_difference(p.nir, p.red, eps),
        SpectralIndex::Gndvi => normalized_difference(p.nir, p.green, eps),
        SpectralIndex::Ndre => normalized_difference(p.nir, p.red_edge, eps),
        SpectralIndex::Savi => {
            let l = params.savi_l;
            ((p.nir - p.red) / (p.nir + p.red + l)) * (1.0 + l)
        }
        SpectralIndex::Evi => {
            let e = &params.evi;
            e.g * (p.nir - p.red) / (p.nir + e.c1 * p.red - e.c2 * p.blue + e.l + eps)
        }
        SpectralIndex::Ndwi => normalized_difference(p.green, p.nir, eps),
        SpectralIndex::Msr => {
            let sr = p.nir / (p.red + eps);
            (sr - 1.0) / (sr + 1.0 + eps).sqrt()
        }
        SpectralIndex::Ci => p.nir / (p.red_edge + eps) - 1.0,
    }
}

/// Compute one index map.
///
/// Fails with `BandCountMismatch` when the stack lacks a band the formula reads.
pub fn index_map(stack: &BandStack, index: SpectralIndex, params: &IndexParams) -> Result<Raster<f64>> {
    let needed = index.bands().iter().map(|b| b.index() + 1).max().unwrap_or(0);
    stack.require_bands(needed)?;

    let (rows, cols) = stack.shape();
    let view = stack.data().view();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| sanitize(evaluate(index, &Pixel::read(&view, row, col), params)))
                .collect::<Vec<_>>()
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    stack.to_raster(array)
}

/// Compute all eight index maps. The stack must carry the full band set.
pub fn compute_indices(stack: &BandStack, params: &IndexParams) -> Result<IndexMaps> {
    stack.require_bands(cropsight_core::raster::BAND_COUNT)?;
    Ok(IndexMaps {
        ndvi: index_map(stack, SpectralIndex::Ndvi, params)?,
        gndvi: index_map(stack, SpectralIndex::Gndvi, params)?,
        ndre: index_map(stack, SpectralIndex::Ndre, params)?,
        savi: index_map(stack, SpectralIndex::Savi, params)?,
        evi: index_map(stack, SpectralIndex::Evi, params)?,
        ndwi: index_map(stack, SpectralIndex::Ndwi, params)?,
        msr: index_map(stack, SpectralIndex::Msr, params)?,
        ci: index_map(stack, SpectralIndex::Ci, params)?,
    })
}

//! Spectral soil-type classification
//!
//! Each pixel is placed in a brightness/wetness feature space:
//! brightness is the mean of Red, NIR and SWIR1, and wetness is the mean
//! of Red and SWIR1 minus NIR. Ordered rectangular rules assign the type;
//! the first matching rule wins.

use super::params::SoilTypeRules;
use crate::maybe_rayon::*;
use cropsight_core::raster::{Band, BandStack, Raster};
use cropsight_core::{Error, Result};
use ndarray::Array2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SoilType {
    Organic,
    Clay,
    Silt,
    Sand,
    Loam,
}

impl SoilType {
    pub const ALL: [SoilType; 5] = [
        Self::Organic,
        Self::Clay,
        Self::Silt,
        Self::Sand,
        Self::Loam,
    ];

    /// Map code (1-based position in [`SoilType::ALL`]; 0 is nodata)
    pub fn code(self) -> u8 {
        match self {
            Self::Organic => 1,
            Self::Clay => 2,
            Self::Silt => 3,
            Self::Sand => 4,
            Self::Loam => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Clay => "Clay",
            Self::Silt => "Silt",
            Self::Sand => "Sand",
            Self::Loam => "Loam",
        }
    }

    /// Classify one pixel from its brightness and wetness
    pub fn classify(brightness: f64, wetness: f64, rules: &SoilTypeRules) -> Self {
        let wet_enough = wetness >= rules.min_wetness;
        if brightness < rules.organic_below {
            Self::Organic
        } else if brightness < rules.clay_below && wet_enough {
            Self::Clay
        } else if (rules.clay_below..rules.silt_below).contains(&brightness) && wet_enough {
            Self::Silt
        } else if brightness >= rules.silt_below {
            Self::Sand
        } else {
            Self::Loam
        }
    }
}

/// Share of one soil type in the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilTypeShare {
    pub soil_type: SoilType,
    pub count: usize,
    pub percentage: f64,
}

/// Soil-type map of a field with its distribution
#[derive(Debug, Clone, Serialize)]
pub struct SoilTypeAnalysis {
    /// One entry per type, in [`SoilType::ALL`] order
    pub distribution: Vec<SoilTypeShare>,
    /// Most frequent type; ties resolve to the earlier type
    pub dominant: SoilType,
    /// Per-pixel [`SoilType::code`]s
    #[serde(skip)]
    pub map: Raster<u8>,
}

/// Classify every pixel of a reflectance stack
pub fn soil_type_map(stack: &BandStack, rules: &SoilTypeRules) -> Result<SoilTypeAnalysis> {
    let red = stack.band(Band::Red)?;
    let nir = stack.band(Band::Nir)?;
    let swir = stack.band(Band::Swir1)?;
    let (rows, cols) = stack.shape();

    let codes: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let (r, n, s) = (red[(row, col)], nir[(row, col)], swir[(row, col)]);
                    let brightness = (r + n + s) / 3.0;
                    let wetness = (r + s) / 2.0 - n;
                    SoilType::classify(brightness, wetness, rules).code()
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), codes).map_err(|e| Error::Other(e.to_string()))?;
    let map = stack.to_raster(array)?;

    let distribution: Vec<SoilTypeShare> = SoilType::ALL
        .iter()
        .map(|&soil_type| SoilTypeShare {
            soil_type,
            count: map.count_where(|c| c == soil_type.code()),
            percentage: map.percent_where(|c| c == soil_type.code()),
        })
        .collect();

    // max_by_key keeps the last maximum, so scan in reverse for the first
    let dominant = distribution
        .iter()
        .rev()
        .max_by_key(|s| s.count)
        .map_or(SoilType::Loam, |s| s.soil_type);

    Ok(SoilTypeAnalysis {
        distribution,
        dominant,
        map,
    })
}

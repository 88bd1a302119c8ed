//! Ordered threshold sets
//!
//! A threshold set of `n` cut points partitions the real line into `n + 1`
//! ordinal levels. Level `0` lies below the first cut; level `n` lies above
//! the last one. The level is monotone non-decreasing in the value.

use crate::maybe_rayon::*;
use cropsight_core::raster::Raster;
use cropsight_core::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Which side of a band owns a value equal to a cut point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Closed {
    /// `(a, b]`: a value equal to a cut stays in the lower level
    Upper,
    /// `[a, b)`: a value equal to a cut moves to the upper level
    Lower,
    /// A value equal to a cut moves toward the middle level, so the middle
    /// band is closed at both ends and the outer bands are open
    Inner,
}

/// Strictly ascending cut points with a boundary rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholdSet")]
pub struct ThresholdSet {
    cuts: Vec<f64>,
    closed: Closed,
}

#[derive(Deserialize)]
struct RawThresholdSet {
    cuts: Vec<f64>,
    closed: Closed,
}

impl TryFrom<RawThresholdSet> for ThresholdSet {
    type Error = Error;

    fn try_from(raw: RawThresholdSet) -> Result<Self> {
        ThresholdSet::new(raw.cuts, raw.closed)
    }
}

impl ThresholdSet {
    /// Validate and build a threshold set.
    ///
    /// Cuts must be finite and strictly ascending.
    pub fn new(cuts: Vec<f64>, closed: Closed) -> Result<Self> {
        if let Some(bad) = cuts.iter().find(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "cuts",
                value: bad.to_string(),
                reason: "cut points must be finite".into(),
            });
        }
        if cuts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidParameter {
                name: "cuts",
                value: format!("{:?}", cuts),
                reason: "cut points must be strictly ascending".into(),
            });
        }
        Ok(Self { cuts, closed })
    }

    /// Built-in presets whose cut points are known to be ascending
    pub(crate) fn preset<const N: usize>(cuts: [f64; N], closed: Closed) -> Self {
        debug_assert!(cuts.windows(2).all(|w| w[0] < w[1]));
        Self {
            cuts: cuts.to_vec(),
            closed,
        }
    }

    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    pub fn closed(&self) -> Closed {
        self.closed
    }

    /// Number of levels (`cuts + 1`)
    pub fn level_count(&self) -> usize {
        self.cuts.len() + 1
    }

    /// Ordinal level of `value`. Non-finite values fall in level 0.
    pub fn level(&self, value: f64) -> usize {
        if !value.is_finite() {
            return 0;
        }
        match self.closed {
            Closed::Upper => self.cuts.iter().filter(|&&c| c < value).count(),
            Closed::Lower => self.cuts.iter().filter(|&&c| c <= value).count(),
            Closed::Inner => {
                let middle = self.cuts.len() / 2;
                self.cuts
                    .iter()
                    .enumerate()
                    .filter(|&(i, &c)| if i < middle { c <= value } else { c < value })
                    .count()
            }
        }
    }

    /// Per-pixel levels of a raster, mapped through `code`
    pub fn classify_raster(
        &self,
        raster: &Raster<f64>,
        code: impl Fn(usize) -> u8 + Sync,
    ) -> Result<Raster<u8>> {
        let (rows, cols) = raster.shape();
        let data = raster.data();

        let codes: Vec<u8> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                (0..cols)
                    .map(|col| code(self.level(data[(row, col)])))
                    .collect::<Vec<_>>()
            })
            .collect();

        let array =
            Array2::from_shape_vec((rows, cols), codes).map_err(|e| Error::Other(e.to_string()))?;
        raster.derived(array)
    }

    /// Percentage (0-100) of finite samples in each level
    pub fn level_percentages(&self, values: impl IntoIterator<Item = f64>) -> Vec<f64> {
        let mut counts = vec![0usize; self.level_count()];
        let mut total = 0usize;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            counts[self.level(v)] += 1;
            total += 1;
        }
        counts
            .into_iter()
            .map(|c| if total == 0 { 0.0 } else { 100.0 * c as f64 / total as f64 })
            .collect()
    }
}

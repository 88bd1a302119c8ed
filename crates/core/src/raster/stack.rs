//! Multi-band reflectance stack

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Number of bands every index formula expects.
pub const BAND_COUNT: usize = 8;

/// Spectral bands in their fixed stack order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
    RedEdge1,
    RedEdge2,
    RedEdge3,
    Swir1,
}

impl Band {
    /// All bands in stack order
    pub const ALL: [Band; BAND_COUNT] = [
        Band::Blue,
        Band::Green,
        Band::Red,
        Band::Nir,
        Band::RedEdge1,
        Band::RedEdge2,
        Band::RedEdge3,
        Band::Swir1,
    ];

    /// Position of the band along the stack's band axis
    pub fn index(self) -> usize {
        match self {
            Band::Blue => 0,
            Band::Green => 1,
            Band::Red => 2,
            Band::Nir => 3,
            Band::RedEdge1 => 4,
            Band::RedEdge2 => 5,
            Band::RedEdge3 => 6,
            Band::Swir1 => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
            Band::RedEdge1 => "red_edge_1",
            Band::RedEdge2 => "red_edge_2",
            Band::RedEdge3 => "red_edge_3",
            Band::Swir1 => "swir1",
        }
    }
}

/// A georeferenced (rows × cols × bands) reflectance cube.
///
/// Values are reflectance in [0, 1] once corrected, or raw sensor
/// counts before that. Band order follows [`Band::ALL`].
#[derive(Debug, Clone)]
pub struct BandStack {
    data: Array3<f64>,
    transform: GeoTransform,
}

impl BandStack {
    /// Wrap a (rows, cols, bands) array. Every axis must be non-empty.
    pub fn from_array(data: Array3<f64>) -> Result<Self> {
        let (rows, cols, bands) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        if bands == 0 {
            return Err(Error::BandCountMismatch {
                expected: BAND_COUNT,
                actual: 0,
            });
        }
        Ok(Self {
            data,
            transform: GeoTransform::default(),
        })
    }

    /// A stack where every pixel carries the same spectrum
    pub fn uniform(rows: usize, cols: usize, spectrum: &[f64]) -> Result<Self> {
        let mut data = Array3::zeros((rows, cols, spectrum.len()));
        for (b, &v) in spectrum.iter().enumerate() {
            data.index_axis_mut(Axis(2), b).fill(v);
        }
        Self::from_array(data)
    }

    /// Stack single-band rasters (in [`Band::ALL`] order) into a cube.
    ///
    /// The georeference of the first band is kept.
    pub fn from_bands(bands: &[Raster<f64>]) -> Result<Self> {
        let first = bands.first().ok_or(Error::BandCountMismatch {
            expected: BAND_COUNT,
            actual: 0,
        })?;
        let (rows, cols) = first.shape();

        let mut data = Array3::zeros((rows, cols, bands.len()));
        for (b, band) in bands.iter().enumerate() {
            first.check_same_shape(band)?;
            data.index_axis_mut(Axis(2), b).assign(band.data());
        }

        let mut stack = Self::from_array(data)?;
        stack.transform = *first.transform();
        Ok(stack)
    }

    /// New stack with the same georeference and different data
    pub fn with_data(&self, data: Array3<f64>) -> Result<Self> {
        if data.dim() != self.data.dim() {
            let (ar, ac, _) = data.dim();
            return Err(Error::SizeMismatch {
                er: self.rows(),
                ec: self.cols(),
                ar,
                ac,
            });
        }
        Ok(Self {
            data,
            transform: self.transform,
        })
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn band_count(&self) -> usize {
        self.data.dim().2
    }

    /// Spatial dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Fail fast unless the stack carries at least `expected` bands
    pub fn require_bands(&self, expected: usize) -> Result<()> {
        if self.band_count() < expected {
            return Err(Error::BandCountMismatch {
                expected,
                actual: self.band_count(),
            });
        }
        Ok(())
    }

    /// View of one band
    pub fn band(&self, band: Band) -> Result<ArrayView2<'_, f64>> {
        self.require_bands(band.index() + 1)?;
        Ok(self.data.index_axis(Axis(2), band.index()))
    }

    /// An empty raster sharing this stack's shape and georeference
    pub fn blank<T: RasterElement>(&self) -> Raster<T> {
        let mut raster = Raster::new(self.rows(), self.cols());
        raster.set_transform(self.transform);
        raster
    }

    /// Wrap a per-pixel array as a raster with this stack's georeference
    pub fn to_raster<T: RasterElement>(&self, data: Array2<T>) -> Result<Raster<T>> {
        self.blank::<T>().derived(data)
    }

    /// Pixels as rows of a (rows*cols, bands) matrix, in row-major pixel order
    pub fn pixel_matrix(&self) -> Result<Array2<f64>> {
        let (rows, cols, bands) = self.data.dim();
        Array2::from_shape_vec((rows * cols, bands), self.data.iter().copied().collect())
            .map_err(|e| Error::Other(e.to_string()))
    }

    /// Mean band vector over every pixel
    pub fn mean_spectrum(&self) -> Array1<f64> {
        let n = (self.rows() * self.cols()) as f64;
        self.data.sum_axis(Axis(0)).sum_axis(Axis(0)) / n
    }

    /// Block-average the stack by `factor` in both spatial directions.
    ///
    /// Edge blocks that are smaller than `factor × factor` are averaged
    /// over the pixels they contain.
    pub fn downsample(&self, factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(Error::InvalidParameter {
                name: "downsample",
                value: factor.to_string(),
                reason: "factor must be at least 1".into(),
            });
        }
        if factor == 1 {
            return Ok(self.clone());
        }

        let (rows, cols, bands) = self.data.dim();
        let out_rows = rows.div_ceil(factor);
        let out_cols = cols.div_ceil(factor);
        let mut out = Array3::zeros((out_rows, out_cols, bands));

        for r in 0..out_rows {
            for c in 0..out_cols {
                let r0 = r * factor;
                let c0 = c * factor;
                let r1 = (r0 + factor).min(rows);
                let c1 = (c0 + factor).min(cols);
                let block = self.data.slice(s![r0..r1, c0..c1, ..]);
                let n = ((r1 - r0) * (c1 - c0)) as f64;
                let mean = block.sum_axis(Axis(0)).sum_axis(Axis(0)) / n;
                out.slice_mut(s![r, c, ..]).assign(&mean);
            }
        }

        Ok(Self {
            data: out,
            transform: self.transform.coarsened(factor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum() -> [f64; BAND_COUNT] {
        [0.05, 0.1, 0.1, 0.6, 0.2, 0.3, 0.4, 0.25]
    }

    #[test]
    fn test_band_order_is_fixed() {
        for (i, band) in Band::ALL.iter().enumerate() {
            assert_eq!(band.index(), i);
        }
    }

    #[test]
    fn test_band_view() {
        let stack = BandStack::uniform(4, 5, &spectrum()).unwrap();
        let nir = stack.band(Band::Nir).unwrap();
        assert_eq!(nir.dim(), (4, 5));
        assert!(nir.iter().all(|&v| (v - 0.6).abs() < 1e-12));
    }

    #[test]
    fn test_missing_band_fails_fast() {
        let stack = BandStack::uniform(4, 4, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert!(stack.band(Band::Nir).is_ok());
        assert!(matches!(
            stack.band(Band::Swir1),
            Err(Error::BandCountMismatch { expected: 8, actual: 4 })
        ));
    }

    #[test]
    fn test_from_bands_shape_mismatch() {
        let a = Raster::filled(3, 3, 0.1);
        let b = Raster::filled(3, 4, 0.1);
        assert!(matches!(
            BandStack::from_bands(&[a, b]),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_pixel_matrix_order() {
        let mut data = Array3::zeros((2, 2, 2));
        data[[1, 0, 1]] = 7.0;
        let stack = BandStack::from_array(data).unwrap();
        let m = stack.pixel_matrix().unwrap();
        assert_eq!(m.dim(), (4, 2));
        assert_eq!(m[[2, 1]], 7.0);
    }

    #[test]
    fn test_mean_spectrum() {
        let stack = BandStack::uniform(3, 3, &spectrum()).unwrap();
        let mean = stack.mean_spectrum();
        for (m, s) in mean.iter().zip(spectrum()) {
            assert!((m - s).abs() < 1e-12);
        }
    }

    #[test]
    fn test_downsample_block_mean() {
        let mut data = Array3::zeros((4, 5, 1));
        for r in 0..4 {
            for c in 0..5 {
                data[[r, c, 0]] = (r * 5 + c) as f64;
            }
        }
        let stack = BandStack::from_array(data).unwrap();
        let small = stack.downsample(2).unwrap();

        assert_eq!(small.shape(), (2, 3));
        // Block rows 0..2, cols 0..2: 0, 1, 5, 6
        assert!((small.data()[[0, 0, 0]] - 3.0).abs() < 1e-12);
        // Partial edge block rows 0..2, col 4: 4, 9
        assert!((small.data()[[0, 2, 0]] - 6.5).abs() < 1e-12);
        assert!(stack.downsample(0).is_err());
    }
}

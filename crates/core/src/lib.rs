//! # Cropsight Core
//!
//! Core types and I/O for the Cropsight field-analysis engine.
//!
//! This crate provides:
//! - `Raster<T>`: Generic 2D grid used for index, anomaly, level and risk maps
//! - `BandStack`: Multi-band reflectance cube with a fixed band order
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `SensorSeries`: Ground-sensor readings
//! - A single error type shared by every pipeline stage
//! - Single-band GeoTIFF reading and writing

pub mod error;
pub mod io;
pub mod raster;
pub mod sensors;

pub use error::{Error, Result};
pub use raster::{Band, BandStack, GeoTransform, Raster, RasterElement};
pub use sensors::SensorSeries;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Band, BandStack, GeoTransform, Raster, RasterElement};
    pub use crate::sensors::SensorSeries;
}

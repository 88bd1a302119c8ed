//! Error types for Cropsight

use thiserror::Error;

/// Main error type for Cropsight operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Band count mismatch: expected at least {expected} bands, got {actual}")]
    BandCountMismatch { expected: usize, actual: usize },

    #[error("Sensor series '{name}' has {actual} samples, expected {expected}")]
    SeriesLengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Sensor series '{0}' was not supplied")]
    EmptySeries(&'static str),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Cropsight operations
pub type Result<T> = std::result::Result<T, Error>;

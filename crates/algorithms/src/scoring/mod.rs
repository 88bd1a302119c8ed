//! Threshold classification and weighted score fusion
//!
//! - **thresholds**: ordered cut points partitioning a value range into levels
//! - **levels**: the ordinal level/status vocabularies shared by the scorers
//! - **composite**: weighted fusion of sub-scores with a dispersion-based confidence

pub mod composite;
pub mod levels;
pub mod thresholds;

pub use composite::{dispersion_confidence, fuse, validate_weights, CompositeScore};
pub use levels::{HealthLevel, HealthStatus, LevelCode, RiskLevel};
pub use thresholds::{Closed, ThresholdSet};

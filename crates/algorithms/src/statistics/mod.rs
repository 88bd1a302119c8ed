//! Statistical helpers for index maps and sensor series
//!
//! - **summary**: descriptive statistics, percentiles, z-score outliers
//! - **focal**: moving-window mean, standard deviation and median

pub mod focal;
pub mod summary;

pub use focal::{focal_mean_std, focal_median, FocalMoments};
pub use summary::{
    finite_values, mean, percentile, std_dev, summarize, zscore_outliers, Summary,
};

//! Data quality analysis module.
//!
//! Scores a dataset by completeness of the six expected fields and flags
//! 3-sigma outliers in clicks and impressions.

mod analyzer;

pub use analyzer::{DataQualityAnalyzer, MAX_HEALTH_SCORE, OUTLIER_SIGMA, is_outlier};

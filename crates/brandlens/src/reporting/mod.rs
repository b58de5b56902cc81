//! Report generation module.
//!
//! Turns a finished run into insights, a JSON [`AnalysisReport`] and the CSV
//! export files.
//!
//! # Example
//!
//! ```rust,ignore
//! use brandlens::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("data.csv", &config, &outcome);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&report, "data")?;
//! generator.write_exports(&outcome, &report.insights, "data")?;
//! ```

mod generator;
mod insights;

pub use generator::{AnalysisReport, ReportGenerator};
pub use insights::{
    BRANDED_HEAVY_MIN_ROWS, BRANDED_HEAVY_THRESHOLD, Insight, InsightGenerator, InsightKind,
};

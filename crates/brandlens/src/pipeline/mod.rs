//! Pipeline module.
//!
//! Runs validation, aggregation and quality analysis in order, with
//! optional progress reporting.

mod builder;
pub mod progress;

pub use builder::{AnalysisOutcome, Pipeline, PipelineBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};

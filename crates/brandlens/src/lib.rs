//! Branded Search Traffic Analysis Library
//!
//! Classifies search-performance records (query, landing page, clicks,
//! impressions, CTR, position) as branded or non-branded traffic and
//! aggregates them by category, URL path, language and content type, with a
//! separate data-quality score.
//!
//! # Overview
//!
//! - **Brand Matching**: term-list substring matching, or a user pattern
//!   evaluated under a step budget
//! - **Segmentation**: language code and primary path from each landing page
//! - **Aggregation**: one forward pass with running metrics, grouping tables,
//!   samples and duplicate detection
//! - **Quality Analysis**: missing-field counts, 3-sigma outliers and a health score
//! - **Export Guards**: formula and markup neutralization, executable-content rejection
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use brandlens::{ClassificationConfig, Pipeline, ingest};
//!
//! let df = ingest::load_csv("search_console.csv")?;
//!
//! let config = ClassificationConfig::builder()
//!     .brand_terms("acme, acme corp")
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run_frame(&df)?;
//!
//! println!("Branded: {:.1}%", outcome.result.summary.branded_percentage);
//! println!("Health score: {:.1}", outcome.quality.health_score);
//! ```
//!
//! # Pattern Mode
//!
//! ```rust,ignore
//! let config = ClassificationConfig::builder()
//!     .custom_pattern(r"^acme(\s+corp)?\b")
//!     .case_sensitive(false)
//!     .build()?;
//! ```
//!
//! A pattern that fails to compile, or whose evaluation crosses the step
//! budget, classifies the query as non-branded. It never fails the run.

pub mod aggregation;
pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod segmenter;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregation::AggregationEngine;
pub use classifier::{
    BrandMatcher, ContentTypeCache, ContentTypeClassifier, ContentTypeLookup, PatternOutcome,
    SharedContentTypeCache,
};
pub use config::{
    ClassificationConfig, ClassificationConfigBuilder, ConfigValidationError, MatchMode,
};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use export::{CsvExporter, ExportKind, sanitize_cell, sanitize_html, validate_content};
pub use pipeline::{
    AnalysisOutcome, AnalysisStage, ClosureProgressReporter, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use quality::DataQualityAnalyzer;
pub use reporting::{AnalysisReport, Insight, InsightGenerator, InsightKind, ReportGenerator};
pub use segmenter::{PathLanguageSegmenter, PathSegments};
pub use statistics::{RunningMean, RunningStats};
pub use types::{
    AggregatedResult, Category, CategoryBucket, CategorySplit, ClassifiedRow, ContentType,
    ContentTypeStat, DuplicateEntry, LanguageStat, Metrics, Outlier, PathStat, QualityReport,
    Record, Severity, Summary, Warning, WarningKind,
};

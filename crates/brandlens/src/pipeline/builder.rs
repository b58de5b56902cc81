//! Main analysis pipeline module.
//!
//! This module provides the `Pipeline` struct and builder that run
//! validation, aggregation and quality analysis over one dataset.

use crate::aggregation::AggregationEngine;
use crate::classifier::SharedContentTypeCache;
use crate::config::{ClassificationConfig, ConfigValidationError};
use crate::error::Result;
use crate::ingest::{records_from_dataframe, validate_dataset};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::quality::DataQualityAnalyzer;
use crate::types::{AggregatedResult, QualityReport, Record};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything one run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub result: AggregatedResult,
    pub quality: QualityReport,
}

/// The analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline. A pipeline holds no
/// per-run state, so one instance may serve any number of runs, from any
/// number of threads.
///
/// # Example
///
/// ```rust,ignore
/// use brandlens::{ClassificationConfig, Pipeline, SharedContentTypeCache};
///
/// let cache = SharedContentTypeCache::new();
/// let outcome = Pipeline::builder()
///     .config(ClassificationConfig::builder().brand_terms("acme").build()?)
///     .content_type_cache(cache.clone())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&records)?;
/// ```
pub struct Pipeline {
    engine: AggregationEngine,
    content_type_cache: Option<SharedContentTypeCache>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &ClassificationConfig {
        self.engine.config()
    }

    /// Validate, aggregate and score `records`.
    ///
    /// # Errors
    ///
    /// Returns a dataset rejection (missing or empty columns, malicious
    /// content, no rows) before any aggregation work is done.
    pub fn run(&self, records: &[Record]) -> Result<AnalysisOutcome> {
        match self.run_internal(records) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Analyzed {} rows",
                    outcome.result.summary.total_rows
                )));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis failed: {}", e);
                Err(e)
            }
        }
    }

    /// Convert `df` to records and [`run`](Self::run) them.
    pub fn run_frame(&self, df: &DataFrame) -> Result<AnalysisOutcome> {
        let records = records_from_dataframe(df)?;
        self.run(&records)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, records: &[Record]) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Validating,
            0.0,
            format!("Validating {} rows...", records.len()),
        ));
        validate_dataset(records)?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            0.0,
            "Classifying and aggregating rows...",
        ));
        let result = match &self.content_type_cache {
            Some(shared) => {
                let mut cache = shared.clone();
                self.engine.aggregate_with_cache(records, &mut cache)
            }
            None => self.engine.aggregate(records),
        };
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Aggregating,
            1.0,
            format!(
                "{} branded, {} non-branded, {} skipped",
                result.summary.branded_count,
                result.summary.non_branded_count,
                result.summary.skipped_rows
            ),
        ));

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::AnalyzingQuality,
            0.0,
            "Scoring data quality...",
        ));
        let quality = DataQualityAnalyzer::analyze(&result.data);

        info!(
            "Analysis finished in {}ms (health score {:.1})",
            start_time.elapsed().as_millis(),
            quality.health_score
        );

        Ok(AnalysisOutcome { result, quality })
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<ClassificationConfig>,
    content_type_cache: Option<SharedContentTypeCache>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    pub fn config(mut self, config: ClassificationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a content-type memo with other pipelines.
    ///
    /// Without one, every run classifies URLs with a memo of its own.
    pub fn content_type_cache(mut self, cache: SharedContentTypeCache) -> Self {
        self.content_type_cache = Some(cache);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            engine: AggregationEngine::new(config),
            content_type_cache: self.content_type_cache,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn config() -> ClassificationConfig {
        ClassificationConfig::builder().brand_terms("acme").build().unwrap()
    }

    fn records() -> Vec<Record> {
        [
            json!({"Query": "acme boots", "Page": "https://s.com/de/shop/a", "Clicks": "4",
                   "Impressions": "40", "CTR": "10%", "Position": "1.2"}),
            json!({"Query": "boots", "Page": "https://s.com/blog/b", "Clicks": "1",
                   "Impressions": "1,000", "CTR": "0.1%", "Position": "8"}),
        ]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    #[test]
    fn test_pipeline_builder_requires_valid_config() {
        assert!(matches!(
            Pipeline::builder().build(),
            Err(ConfigValidationError::NoBrandTerms)
        ));
    }

    #[test]
    fn test_pipeline_builder_with_config() {
        let pipeline = Pipeline::builder().config(config()).build().unwrap();
        assert_eq!(pipeline.config().brand_terms, "acme");
        assert!(pipeline.content_type_cache.is_none());
    }

    #[test]
    fn test_run_produces_result_and_quality() {
        let pipeline = Pipeline::builder().config(config()).build().unwrap();
        let outcome = pipeline.run(&records()).unwrap();

        assert_eq!(outcome.result.summary.branded_count, 1);
        assert_eq!(outcome.result.summary.non_branded_count, 1);
        assert_eq!(outcome.result.summary.total_impressions, 1040);
        assert_eq!(outcome.quality.total_rows, 2);
        assert_eq!(outcome.quality.health_score, 95.0);
    }

    #[test]
    fn test_run_reports_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        let pipeline = Pipeline::builder()
            .config(config())
            .on_progress(move |update| sink.lock().push(update.stage))
            .build()
            .unwrap();
        pipeline.run(&records()).unwrap();

        let mut seen = stages.lock().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                AnalysisStage::Validating,
                AnalysisStage::Aggregating,
                AnalysisStage::AnalyzingQuality,
                AnalysisStage::Complete,
            ]
        );
    }

    #[test]
    fn test_rejection_reports_failure() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        let pipeline = Pipeline::builder()
            .config(config())
            .on_progress(move |update| sink.lock().push(update.stage))
            .build()
            .unwrap();

        let rows: Vec<Record> = vec![json!({"query": "acme"}).as_object().cloned().unwrap()];
        let err = pipeline.run(&rows).unwrap_err();

        assert!(err.is_dataset_rejection());
        assert_eq!(stages.lock().last(), Some(&AnalysisStage::Failed));
        assert!(!stages.lock().contains(&AnalysisStage::Aggregating));
    }

    #[test]
    fn test_shared_cache_survives_runs() {
        let cache = SharedContentTypeCache::new();
        let pipeline = Pipeline::builder()
            .config(config())
            .content_type_cache(cache.clone())
            .build()
            .unwrap();

        pipeline.run(&records()).unwrap();
        pipeline.run(&records()).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_runs_on_worker_threads() {
        let pipeline = Arc::new(Pipeline::builder().config(config()).build().unwrap());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || pipeline.run(&records()).unwrap().result.summary)
            })
            .collect();

        let summaries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(summaries.windows(2).all(|pair| pair[0] == pair[1]));
    }
}

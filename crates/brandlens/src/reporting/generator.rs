use super::insights::{Insight, InsightGenerator};
use crate::config::ClassificationConfig;
use crate::error::Result;
use crate::export::{CsvExporter, ExportKind};
use crate::pipeline::AnalysisOutcome;
use crate::types::{QualityReport, Summary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Report of one analysis run.
///
/// Used both for JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    pub config: ClassificationConfig,
    pub summary: Summary,
    pub quality: QualityReport,
    pub insights: Vec<Insight>,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the report of a finished run.
    pub fn build_report(
        input_file: &str,
        config: &ClassificationConfig,
        outcome: &AnalysisOutcome,
    ) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            config: config.clone(),
            summary: outcome.result.summary.clone(),
            quality: outcome.quality.clone(),
            insights: InsightGenerator::generate(&outcome.result, &outcome.quality),
        }
    }

    /// Write `report` as pretty JSON to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport, report_base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write every CSV export of a run next to the report.
    pub fn write_exports(
        &self,
        outcome: &AnalysisOutcome,
        insights: &[Insight],
        base_name: &str,
    ) -> Result<Vec<PathBuf>> {
        ExportKind::ALL
            .iter()
            .map(|kind| {
                CsvExporter::write_to_dir(*kind, &outcome.result, insights, &self.output_dir, base_name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::types::Record;
    use serde_json::json;

    fn outcome(config: &ClassificationConfig) -> AnalysisOutcome {
        let records: Vec<Record> = [
            json!({"query": "acme", "page": "/a", "clicks": 1, "impressions": 2, "ctr": 0.5, "position": 1}),
            json!({"query": "shoes", "page": "/b", "clicks": 1, "impressions": 2, "ctr": 0.5, "position": 3}),
        ]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
        Pipeline::builder()
            .config(config.clone())
            .build()
            .unwrap()
            .run(&records)
            .unwrap()
    }

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("brandlens_{}_{}", label, std::process::id()))
    }

    #[test]
    fn test_build_report() {
        let config = ClassificationConfig::builder().brand_terms("acme").build().unwrap();
        let report = ReportGenerator::build_report("data.csv", &config, &outcome(&config));

        assert_eq!(report.input_file, "data.csv");
        assert_eq!(report.summary.total_rows, 2);
        assert!(!report.insights.is_empty());

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("generatedAt").is_some());
        assert_eq!(value["config"]["brandTerms"], "acme");
        assert_eq!(value["summary"]["brandedPercentage"], 50.0);
    }

    #[test]
    fn test_write_report_and_exports() {
        let dir = temp_dir("report");
        let config = ClassificationConfig::builder().brand_terms("acme").build().unwrap();
        let outcome = outcome(&config);
        let report = ReportGenerator::build_report("data.csv", &config, &outcome);
        let generator = ReportGenerator::new(dir.clone());

        let path = generator.write_report_to_file(&report, "data").unwrap();
        let written: AnalysisReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.summary, report.summary);
        assert_eq!(written.insights.len(), report.insights.len());

        let exports = generator.write_exports(&outcome, &report.insights, "data").unwrap();
        assert_eq!(exports.len(), 4);
        assert!(exports.iter().all(|p| p.exists()));

        fs::remove_dir_all(&dir).ok();
    }
}

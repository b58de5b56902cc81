use crate::statistics::RunningStats;
use crate::types::{Outlier, QualityReport, REQUIRED_FIELDS, Record, Severity, Warning, WarningKind};
use crate::utils::{coerce_impressions, coerce_number, field_text, is_missing};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Fields screened for statistical outliers.
const OUTLIER_FIELDS: [&str; 2] = ["clicks", "impressions"];

/// Distance from the mean, in standard deviations, beyond which a value is flagged.
pub const OUTLIER_SIGMA: f64 = 3.0;

/// Highest health score a dataset can reach.
pub const MAX_HEALTH_SCORE: f64 = 95.0;

/// Whether `value` lies strictly outside `mean ± 3·std_dev`.
#[inline]
pub fn is_outlier(value: f64, mean: f64, std_dev: f64) -> bool {
    (value - mean).abs() > OUTLIER_SIGMA * std_dev
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Score a dataset whose keys are already lower-cased.
    pub fn analyze(rows: &[Record]) -> QualityReport {
        info!("Analyzing data quality of {} rows...", rows.len());

        let mut missing_values: BTreeMap<String, usize> = REQUIRED_FIELDS
            .iter()
            .map(|field| (field.to_string(), 0))
            .collect();
        let mut rows_with_missing = 0usize;

        for row in rows {
            let mut row_missing = false;
            for field in REQUIRED_FIELDS {
                if is_missing(row.get(field)) {
                    row_missing = true;
                    if let Some(count) = missing_values.get_mut(field) {
                        *count += 1;
                    }
                }
            }
            if row_missing {
                rows_with_missing += 1;
            }
        }

        let outliers = Self::detect_outliers(rows);

        let total_missing: usize = missing_values.values().sum();
        let cells = rows.len() * REQUIRED_FIELDS.len();
        let completeness = if cells == 0 {
            0.0
        } else {
            (1.0 - total_missing as f64 / cells as f64) * 100.0
        };
        let health_score = completeness.clamp(0.0, MAX_HEALTH_SCORE);

        let mut warnings = Vec::new();

        if total_missing > 0 {
            let by_field: BTreeMap<&String, &usize> =
                missing_values.iter().filter(|(_, count)| **count > 0).collect();
            warnings.push(Warning {
                kind: WarningKind::MissingData,
                severity: Severity::Medium,
                affected_rows: rows_with_missing,
                message: format!(
                    "{} missing values across {} rows",
                    total_missing, rows_with_missing
                ),
                details: json!(by_field),
            });
        }

        let flagged_rows: BTreeSet<usize> = outliers
            .values()
            .flat_map(|list| list.iter().map(|outlier| outlier.index))
            .collect();
        if !flagged_rows.is_empty() {
            let counts: BTreeMap<&String, usize> = outliers
                .iter()
                .map(|(field, list)| (field, list.len()))
                .collect();
            warnings.push(Warning {
                kind: WarningKind::Outliers,
                severity: Severity::Low,
                affected_rows: flagged_rows.len(),
                message: format!(
                    "{} rows hold values more than {} standard deviations from the mean",
                    flagged_rows.len(),
                    OUTLIER_SIGMA
                ),
                details: json!(counts),
            });
        }

        info!(
            "Quality analysis complete: health {:.1}, {} missing values, {} outlier rows",
            health_score,
            total_missing,
            flagged_rows.len()
        );

        QualityReport {
            health_score,
            completeness,
            total_rows: rows.len(),
            missing_values,
            outliers,
            warnings,
        }
    }

    /// Flag 3-sigma outliers per field. Missing cells take no part in the
    /// statistics. Fields without outliers are omitted from the map.
    fn detect_outliers(rows: &[Record]) -> BTreeMap<String, Vec<Outlier>> {
        let mut outliers = BTreeMap::new();

        for field in OUTLIER_FIELDS {
            let values: Vec<(usize, f64)> = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| !is_missing(row.get(field)))
                .map(|(index, row)| (index, Self::numeric(field, row.get(field))))
                .collect();

            let stats: RunningStats = values.iter().map(|(_, value)| *value).collect();
            if stats.count() < 2 {
                continue;
            }
            let (mean, std_dev) = (stats.mean(), stats.std_dev());
            debug!("{}: mean {:.3}, std dev {:.3}", field, mean, std_dev);

            let flagged: Vec<Outlier> = values
                .iter()
                .filter(|(_, value)| is_outlier(*value, mean, std_dev))
                .map(|(index, value)| Outlier {
                    index: *index,
                    query: field_text(&rows[*index], "query"),
                    value: *value,
                    mean,
                })
                .collect();

            if !flagged.is_empty() {
                outliers.insert(field.to_string(), flagged);
            }
        }

        outliers
    }

    fn numeric(field: &str, value: Option<&Value>) -> f64 {
        if field == "impressions" {
            coerce_impressions(value)
        } else {
            coerce_number(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn complete_row(query: &str, clicks: f64, impressions: f64) -> Record {
        record(json!({
            "query": query,
            "page": "https://site.com/a",
            "clicks": clicks,
            "impressions": impressions,
            "ctr": 0.1,
            "position": 1.0,
        }))
    }

    #[test]
    fn test_is_outlier_boundary() {
        assert!(!is_outlier(13.0, 10.0, 1.0));
        assert!(!is_outlier(7.0, 10.0, 1.0));
        assert!(is_outlier(13.000_001, 10.0, 1.0));
        assert!(is_outlier(6.999_999, 10.0, 1.0));
        assert!(!is_outlier(10.0, 10.0, 0.0));
    }

    #[test]
    fn test_empty_dataset_scores_zero() {
        let report = DataQualityAnalyzer::analyze(&[]);
        assert_eq!(report.health_score, 0.0);
        assert_eq!(report.completeness, 0.0);
        assert!(report.warnings.is_empty());
        assert_eq!(report.missing_values.len(), REQUIRED_FIELDS.len());
    }

    #[test]
    fn test_complete_dataset_is_capped() {
        let rows: Vec<Record> = (0..5).map(|i| complete_row(&format!("q{}", i), 1.0, 10.0)).collect();
        let report = DataQualityAnalyzer::analyze(&rows);
        assert_eq!(report.completeness, 100.0);
        assert_eq!(report.health_score, MAX_HEALTH_SCORE);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_all_impressions_missing() {
        let rows: Vec<Record> = (0..4)
            .map(|i| {
                record(json!({
                    "query": format!("q{}", i),
                    "page": "https://site.com/a",
                    "clicks": 1,
                    "impressions": "",
                    "ctr": "1%",
                    "position": 2,
                }))
            })
            .collect();

        let report = DataQualityAnalyzer::analyze(&rows);

        assert_eq!(report.missing_values["impressions"], 4);
        assert_eq!(report.missing_values["clicks"], 0);
        let warning = report
            .warnings
            .iter()
            .find(|w| w.kind == WarningKind::MissingData)
            .unwrap();
        assert_eq!(warning.severity, Severity::Medium);
        assert_eq!(warning.affected_rows, 4);
        assert_eq!(warning.details["impressions"], 4);
        // 4 of 24 cells missing.
        assert!((report.completeness - (1.0 - 4.0 / 24.0) * 100.0).abs() < 1e-9);
        assert!(!report.outliers.contains_key("impressions"));
    }

    #[test]
    fn test_zero_is_not_missing() {
        let report = DataQualityAnalyzer::analyze(&[complete_row("q", 0.0, 0.0)]);
        assert_eq!(report.total_missing(), 0);
    }

    #[test]
    fn test_absent_and_null_fields_are_missing() {
        let rows = vec![record(json!({"query": "q", "page": null, "clicks": 3}))];
        let report = DataQualityAnalyzer::analyze(&rows);
        assert_eq!(report.missing_values["page"], 1);
        assert_eq!(report.missing_values["ctr"], 1);
        assert_eq!(report.total_missing(), 4);
    }

    #[test]
    fn test_outlier_detected() {
        let mut rows: Vec<Record> = (0..20).map(|i| complete_row(&format!("q{}", i), 10.0, 100.0)).collect();
        rows.push(complete_row("spike", 1000.0, 100.0));

        let report = DataQualityAnalyzer::analyze(&rows);

        let clicks = &report.outliers["clicks"];
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].query, "spike");
        assert_eq!(clicks[0].index, 20);
        assert_eq!(clicks[0].value, 1000.0);
        assert!((clicks[0].mean - 1200.0 / 21.0).abs() < 1e-9);
        assert!(!report.outliers.contains_key("impressions"));

        let warning = report
            .warnings
            .iter()
            .find(|w| w.kind == WarningKind::Outliers)
            .unwrap();
        assert_eq!(warning.severity, Severity::Low);
        assert_eq!(warning.affected_rows, 1);
    }

    #[test]
    fn test_impressions_with_separators() {
        let mut rows: Vec<Record> = (0..20)
            .map(|i| {
                record(json!({
                    "query": format!("q{}", i), "page": "/a", "clicks": 1,
                    "impressions": "1,000", "ctr": "1%", "position": 1,
                }))
            })
            .collect();
        rows.push(record(json!({
            "query": "viral", "page": "/a", "clicks": 1,
            "impressions": "1,000,000", "ctr": "1%", "position": 1,
        })));

        let report = DataQualityAnalyzer::analyze(&rows);
        assert_eq!(report.outliers["impressions"][0].value, 1_000_000.0);
    }

    #[test]
    fn test_small_symmetric_spread_has_no_outliers() {
        let rows = vec![
            complete_row("a", 1.0, 10.0),
            complete_row("b", 100.0, 10.0),
        ];
        let report = DataQualityAnalyzer::analyze(&rows);
        assert!(report.outliers.is_empty());
        assert!(!report.has_warning(WarningKind::Outliers));
    }
}

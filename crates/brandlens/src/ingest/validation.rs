//! Dataset-level checks run before any aggregation.

use crate::error::{AnalysisError, Result};
use crate::export::validate_content;
use crate::types::{REQUIRED_FIELDS, Record};
use crate::utils::is_missing;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Refuse datasets that cannot be analyzed.
///
/// Checks, in order: at least one row, every expected column present
/// (case-insensitive), every expected column holding a value in some row,
/// and no executable content in any cell. Column problems name every
/// offending column at once.
pub fn validate_dataset(rows: &[Record]) -> Result<()> {
    if rows.is_empty() {
        warn!("Dataset rejected: no rows");
        return Err(AnalysisError::EmptyDataset);
    }

    let present: HashSet<String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .map(|key| key.trim().to_lowercase())
        .collect();

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !present.contains(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        warn!("Dataset rejected: missing columns {:?}", missing);
        return Err(AnalysisError::MissingColumns(missing));
    }

    let empty: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            rows.iter().all(|row| {
                let value = row
                    .iter()
                    .find(|(key, _)| key.trim().eq_ignore_ascii_case(field))
                    .map(|(_, value)| value);
                is_missing(value)
            })
        })
        .map(|field| field.to_string())
        .collect();
    if !empty.is_empty() {
        warn!("Dataset rejected: empty columns {:?}", empty);
        return Err(AnalysisError::EmptyColumns(empty));
    }

    validate_content(rows)?;

    debug!("Dataset of {} rows passed validation", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn full_row() -> Value {
        json!({
            "Query": "shoes", "Page": "/a", "Clicks": "1",
            "Impressions": "10", "CTR": "10%", "Position": "1.0",
        })
    }

    #[test]
    fn test_accepts_valid_dataset() {
        assert!(validate_dataset(&records(vec![full_row()])).is_ok());
    }

    #[test]
    fn test_rejects_empty_dataset() {
        let err = validate_dataset(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset));
        assert!(err.is_dataset_rejection());
    }

    #[test]
    fn test_reports_every_missing_column() {
        let rows = records(vec![json!({"query": "shoes", "page": "/a", "clicks": 1})]);
        match validate_dataset(&rows).unwrap_err() {
            AnalysisError::MissingColumns(columns) => {
                assert_eq!(columns, vec!["impressions", "ctr", "position"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_entirely_empty_column() {
        let mut first = full_row();
        first["Position"] = json!("");
        let mut second = full_row();
        second["Position"] = Value::Null;

        let err = validate_dataset(&records(vec![first, second])).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_COLUMNS");
        assert_eq!(err.to_string(), "Required columns contain no data: position");
    }

    #[test]
    fn test_partially_empty_column_is_accepted() {
        let mut first = full_row();
        first["Position"] = json!("");
        assert!(validate_dataset(&records(vec![first, full_row()])).is_ok());
    }

    #[test]
    fn test_rejects_malicious_content() {
        let mut row = full_row();
        row["Page"] = json!("javascript:alert(1)");
        let err = validate_dataset(&records(vec![row])).unwrap_err();
        assert_eq!(err.error_code(), "MALICIOUS_CONTENT");
    }
}

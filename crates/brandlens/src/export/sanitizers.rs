//! Guards applied to text crossing the system boundary.
//!
//! The three guards are independent: [`sanitize_cell`] for delimited text
//! exports, [`sanitize_html`] for markup, and [`validate_content`] for
//! uploaded datasets.

use crate::error::{AnalysisError, Result};
use crate::types::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Leading characters a spreadsheet treats as the start of a formula.
pub const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Prefix that makes a spreadsheet read the cell as literal text.
pub const FORMULA_NEUTRALIZER: char = '\'';

static EXECUTABLE_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<script|<iframe|javascript:|data:|vbscript:")
        .expect("executable content pattern is valid")
});

/// Neutralize a cell that would otherwise be evaluated as a formula.
pub fn sanitize_cell(value: &str) -> String {
    if value.starts_with(FORMULA_TRIGGERS) {
        format!("{}{}", FORMULA_NEUTRALIZER, value)
    } else {
        value.to_string()
    }
}

/// Escape the five markup-significant characters.
pub fn sanitize_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Return the first executable-content marker found in `text`, lower-cased.
pub fn find_executable_marker(text: &str) -> Option<String> {
    EXECUTABLE_CONTENT
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// Reject a dataset if any cell carries script or markup markers.
///
/// Rows are scanned in order and the first hit aborts the scan.
pub fn validate_content(rows: &[Record]) -> Result<()> {
    for (row, record) in rows.iter().enumerate() {
        for (column, value) in record {
            let Value::String(text) = value else {
                continue;
            };
            if let Some(marker) = find_executable_marker(text) {
                return Err(AnalysisError::MaliciousContent {
                    row,
                    column: column.clone(),
                    marker,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_cell_neutralizes_formulas() {
        assert_eq!(sanitize_cell("=1+1"), "'=1+1");
        assert_eq!(sanitize_cell("+SUM(A1)"), "'+SUM(A1)");
        assert_eq!(sanitize_cell("-2"), "'-2");
        assert_eq!(sanitize_cell("@cmd"), "'@cmd");
        assert!(!sanitize_cell("=HYPERLINK(\"x\")").starts_with('='));
    }

    #[test]
    fn test_sanitize_cell_leaves_plain_text() {
        assert_eq!(sanitize_cell("brand shoes"), "brand shoes");
        assert_eq!(sanitize_cell("a=b"), "a=b");
        assert_eq!(sanitize_cell(""), "");
    }

    #[test]
    fn test_sanitize_html() {
        assert_eq!(
            sanitize_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(sanitize_html("plain"), "plain");
    }

    #[test]
    fn test_find_executable_marker_case_insensitive() {
        assert_eq!(find_executable_marker("<SCRIPT>alert(1)"), Some("<script".to_string()));
        assert_eq!(find_executable_marker("JavaScript:void(0)"), Some("javascript:".to_string()));
        assert_eq!(find_executable_marker("<iframe src=x>"), Some("<iframe".to_string()));
        assert_eq!(find_executable_marker("vbscript:msgbox"), Some("vbscript:".to_string()));
        assert_eq!(find_executable_marker("data:text/html,hi"), Some("data:".to_string()));
        assert_eq!(find_executable_marker("big data analytics"), None);
    }

    #[test]
    fn test_validate_content_accepts_clean_rows() {
        let rows = vec![
            json!({"query": "shoes", "page": "https://site.com/a", "clicks": 3})
                .as_object()
                .cloned()
                .unwrap(),
        ];
        assert!(validate_content(&rows).is_ok());
    }

    #[test]
    fn test_validate_content_rejects_first_match() {
        let rows: Vec<Record> = [
            json!({"query": "fine", "page": "/a"}),
            json!({"query": "<script>alert(1)</script>", "page": "/b"}),
            json!({"query": "javascript:x", "page": "/c"}),
        ]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let err = validate_content(&rows).unwrap_err();
        assert_eq!(err.error_code(), "MALICIOUS_CONTENT");
        match err {
            AnalysisError::MaliciousContent { row, column, marker } => {
                assert_eq!(row, 1);
                assert_eq!(column, "query");
                assert_eq!(marker, "<script");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

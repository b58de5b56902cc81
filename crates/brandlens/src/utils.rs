//! Shared utilities: key normalization and numeric coercion of loosely typed
//! cell values.
//!
//! Coercion never fails. Anything that cannot be read as a finite number
//! becomes `0.0`, matching how exported search-console data is usually
//! consumed.

use crate::types::Record;
use serde_json::Value;

// =============================================================================
// Record Utilities
// =============================================================================

/// Return a copy of `record` with every key trimmed and lower-cased.
///
/// When two keys collide after normalization the later one wins.
pub fn normalize_keys(record: &Record) -> Record {
    record
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value.clone()))
        .collect()
}

/// Read a field as trimmed text. Null and missing fields yield an empty string.
pub fn field_text(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Whether a cell counts as missing: absent, null, blank text or `false`.
///
/// Numeric zero is a real value and is never missing.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(_)) | Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Thousands separators stripped from impression counts.
pub const THOUSANDS_SEPARATORS: [char; 3] = [',', '_', '\u{a0}'];

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Parse a trimmed string as `f64`, falling back to 0.
pub fn parse_or_zero(s: &str) -> f64 {
    s.trim().parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

/// Coerce a cell to a number; non-numeric values become 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Some(Value::String(s)) => parse_or_zero(s),
        _ => 0.0,
    }
}

/// Coerce an impressions cell, stripping thousands separators first.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(coerce_impressions(Some(&json!("1,234"))), 1234.0);
/// ```
pub fn coerce_impressions(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::String(s)) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !THOUSANDS_SEPARATORS.contains(c))
                .collect();
            parse_or_zero(&cleaned)
        }
        other => coerce_number(other),
    }
}

/// Coerce a click-through rate to a fraction.
///
/// `"12.5%"` becomes `0.125`; plain numbers are taken as already fractional.
pub fn coerce_ctr(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            match trimmed.strip_suffix('%') {
                Some(number) => parse_or_zero(number) / 100.0,
                None => parse_or_zero(trimmed),
            }
        }
        other => coerce_number(other),
    }
}

/// Convert a coerced value to a non-negative whole count.
pub fn to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// `part / total * 100`, defined as 0 when `total` is 0.
#[inline]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Truncate a string to `max_len` characters with an ellipsis.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

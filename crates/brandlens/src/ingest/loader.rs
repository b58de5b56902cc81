//! CSV loading and `DataFrame` → record conversion.

use crate::error::{Result, ResultExt};
use crate::types::Record;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde_json::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn read_options() -> CsvReadOptions {
    // Every column stays text; coercion happens during aggregation.
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Load a CSV file with multiple fallback strategies.
///
/// Tries a standard quoted read, then a read without quote handling, then a
/// read of the file with blank lines removed.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    match read_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    match read_options()
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    let content = std::fs::read_to_string(path)
        .map_err(crate::error::AnalysisError::from)
        .context(format!("Could not read {}", path.display()))?;
    load_csv_from_str(&clean_csv_content(&content))
}

/// Parse CSV text already held in memory.
pub fn load_csv_from_str(content: &str) -> Result<DataFrame> {
    read_options()
        .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
        .finish()
        .context("Failed to parse CSV content")
}

/// Drop blank lines.
pub fn clean_csv_content(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert every row of `df` into a [`Record`] keyed by column name.
///
/// Cells are read as text; nulls become JSON `null`.
pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<Record>> {
    let mut columns: Vec<(String, StringChunked)> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column
            .as_materialized_series()
            .cast(&DataType::String)
            .context(format!("Failed to read column '{}' as text", column.name()))?;
        columns.push((column.name().to_string(), series.str()?.clone()));
    }

    let records = (0..df.height())
        .map(|i| {
            columns
                .iter()
                .map(|(name, values)| {
                    let value = match values.get(i) {
                        Some(text) => Value::String(text.to_string()),
                        None => Value::Null,
                    };
                    (name.clone(), value)
                })
                .collect::<Record>()
        })
        .collect();

    Ok(records)
}

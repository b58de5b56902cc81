//! CSV exports of the aggregated tables.
//!
//! Every table is assembled as an all-text polars `DataFrame`, every cell is
//! passed through [`sanitize_cell`], and the writer quotes every field.

use super::sanitizers::sanitize_cell;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::reporting::Insight;
use crate::types::AggregatedResult;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// The tables that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Paths,
    Queries,
    Languages,
    Insights,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [Self::Paths, Self::Queries, Self::Languages, Self::Insights];

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Paths => &["Path", "Total", "Branded", "Non-Branded", "Branded %", "Non-Branded %"],
            Self::Queries => &[
                "Query",
                "Page",
                "Category",
                "Clicks",
                "Impressions",
                "CTR",
                "Position",
                "Content Type",
                "Language",
                "Path",
            ],
            Self::Languages => &["Language", "Total", "Clicks", "Branded %", "Non-Branded %"],
            Self::Insights => &["Kind", "Title", "Detail", "Value"],
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Paths => "paths",
            Self::Queries => "queries",
            Self::Languages => "languages",
            Self::Insights => "insights",
        }
    }
}

pub struct CsvExporter;

impl CsvExporter {
    /// Collect the text rows of one export table.
    pub fn rows(kind: ExportKind, result: &AggregatedResult, insights: &[Insight]) -> Vec<Vec<String>> {
        match kind {
            ExportKind::Paths => result
                .path_stats
                .iter()
                .map(|stat| {
                    vec![
                        stat.path.clone(),
                        stat.split.total.to_string(),
                        stat.split.branded.to_string(),
                        stat.split.non_branded.to_string(),
                        format!("{:.1}", stat.split.branded_percentage),
                        format!("{:.1}", stat.split.non_branded_percentage),
                    ]
                })
                .collect(),
            ExportKind::Queries => result
                .rows
                .iter()
                .map(|row| {
                    vec![
                        row.query.clone(),
                        row.page.clone(),
                        row.category.display_name().to_string(),
                        row.clicks.to_string(),
                        row.impressions.to_string(),
                        format!("{:.2}%", row.ctr * 100.0),
                        format!("{:.1}", row.position),
                        row.content_type.to_string(),
                        row.lang.clone(),
                        row.path.clone(),
                    ]
                })
                .collect(),
            ExportKind::Languages => result
                .language_stats
                .iter()
                .map(|stat| {
                    vec![
                        stat.lang.clone(),
                        stat.split.total.to_string(),
                        stat.clicks.to_string(),
                        format!("{:.1}", stat.split.branded_percentage),
                        format!("{:.1}", stat.split.non_branded_percentage),
                    ]
                })
                .collect(),
            ExportKind::Insights => insights
                .iter()
                .map(|insight| {
                    vec![
                        insight.kind.as_str().to_string(),
                        insight.title.clone(),
                        insight.detail.clone(),
                        format!("{:.2}", insight.value),
                    ]
                })
                .collect(),
        }
    }

    /// Build the sanitized, all-text `DataFrame` of one export table.
    pub fn build_frame(
        kind: ExportKind,
        result: &AggregatedResult,
        insights: &[Insight],
    ) -> Result<DataFrame> {
        let rows = Self::rows(kind, result, insights);
        let columns: Vec<Column> = kind
            .headers()
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let values: Vec<String> = rows.iter().map(|row| sanitize_cell(&row[i])).collect();
                Series::new((*header).into(), values).into()
            })
            .collect();

        DataFrame::new(columns).context(format!("Failed to build {} export", kind.file_suffix()))
    }

    /// Write `df` as CSV with every field quoted.
    pub fn write_frame<W: Write>(df: &mut DataFrame, writer: &mut W) -> Result<()> {
        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .with_quote_style(QuoteStyle::Always)
            .finish(df)
            .map_err(|e| AnalysisError::Export(e.to_string()))
    }

    /// Render one export table as a CSV string.
    pub fn to_csv_string(
        kind: ExportKind,
        result: &AggregatedResult,
        insights: &[Insight],
    ) -> Result<String> {
        let mut df = Self::build_frame(kind, result, insights)?;
        let mut buffer: Vec<u8> = Vec::new();
        Self::write_frame(&mut df, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| AnalysisError::Export(e.to_string()))
    }

    /// Write one export table to `<output_dir>/<base_name>_<kind>.csv`.
    pub fn write_to_dir(
        kind: ExportKind,
        result: &AggregatedResult,
        insights: &[Insight],
        output_dir: &Path,
        base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{}_{}.csv", base_name, kind.file_suffix()));

        let mut df = Self::build_frame(kind, result, insights)?;
        let mut file = File::create(&path)?;
        Self::write_frame(&mut df, &mut file)?;

        info!("Export saved: {} ({} rows)", path.display(), df.height());
        Ok(path)
    }
}

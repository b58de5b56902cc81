//! Plain-language findings derived from an aggregation and its quality report.

use crate::segmenter::UNKNOWN_LANGUAGE;
use crate::types::{AggregatedResult, PathStat, QualityReport};
use crate::utils::percentage;
use serde::{Deserialize, Serialize};

/// Branded share at or above which a path counts as branded-heavy.
pub const BRANDED_HEAVY_THRESHOLD: f64 = 80.0;

/// Rows a path needs before it can be called branded-heavy.
pub const BRANDED_HEAVY_MIN_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    BrandedShare,
    TopNonBrandedPath,
    BrandedHeavyPath,
    DominantLanguage,
    Duplicates,
    DataHealth,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrandedShare => "branded_share",
            Self::TopNonBrandedPath => "top_non_branded_path",
            Self::BrandedHeavyPath => "branded_heavy_path",
            Self::DominantLanguage => "dominant_language",
            Self::Duplicates => "duplicates",
            Self::DataHealth => "data_health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub detail: String,
    pub value: f64,
}

impl Insight {
    fn new(kind: InsightKind, title: impl Into<String>, detail: impl Into<String>, value: f64) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: detail.into(),
            value,
        }
    }
}

pub struct InsightGenerator;

impl InsightGenerator {
    pub fn generate(result: &AggregatedResult, quality: &QualityReport) -> Vec<Insight> {
        let summary = &result.summary;
        let mut insights = Vec::new();

        if summary.total_rows > 0 {
            insights.push(Insight::new(
                InsightKind::BrandedShare,
                "Branded share",
                format!(
                    "{} of {} queries ({:.1}%) mention the brand",
                    summary.branded_count, summary.total_rows, summary.branded_percentage
                ),
                summary.branded_percentage,
            ));
        }

        if let Some(top) = Self::top_non_branded_path(&result.path_stats) {
            insights.push(Insight::new(
                InsightKind::TopNonBrandedPath,
                format!("Top non-branded path: {}", top.path),
                format!(
                    "{} non-branded queries land on {} ({:.1}% of its traffic)",
                    top.split.non_branded, top.path, top.split.non_branded_percentage
                ),
                top.split.non_branded as f64,
            ));
        }

        for stat in result.path_stats.iter().filter(|stat| {
            stat.split.total >= BRANDED_HEAVY_MIN_ROWS
                && stat.split.branded_percentage >= BRANDED_HEAVY_THRESHOLD
        }) {
            insights.push(Insight::new(
                InsightKind::BrandedHeavyPath,
                format!("Branded-heavy path: {}", stat.path),
                format!(
                    "{:.1}% of {} queries on {} are branded",
                    stat.split.branded_percentage, stat.split.total, stat.path
                ),
                stat.split.branded_percentage,
            ));
        }

        if let Some(language) = result
            .language_stats
            .iter()
            .find(|stat| stat.lang != UNKNOWN_LANGUAGE)
        {
            let share = percentage(language.split.total, summary.total_rows);
            insights.push(Insight::new(
                InsightKind::DominantLanguage,
                format!("Dominant language: {}", language.lang),
                format!(
                    "{:.1}% of queries land on /{} pages with {} clicks",
                    share, language.lang, language.clicks
                ),
                share,
            ));
        }

        if summary.duplicate_count > 0 {
            insights.push(Insight::new(
                InsightKind::Duplicates,
                "Duplicate rows",
                format!(
                    "{} rows repeat an earlier query and page pair",
                    summary.duplicate_count
                ),
                summary.duplicate_count as f64,
            ));
        }

        insights.push(Insight::new(
            InsightKind::DataHealth,
            "Data health",
            format!(
                "Health score {:.1} with {} missing values and {} warnings",
                quality.health_score,
                quality.total_missing(),
                quality.warnings.len()
            ),
            quality.health_score,
        ));

        insights
    }

    /// The path with the most non-branded rows; the earlier entry wins ties.
    fn top_non_branded_path(stats: &[PathStat]) -> Option<&PathStat> {
        stats
            .iter()
            .filter(|stat| stat.split.non_branded > 0)
            .fold(None, |best: Option<&PathStat>, stat| match best {
                Some(current) if current.split.non_branded >= stat.split.non_branded => Some(current),
                _ => Some(stat),
            })
    }
}

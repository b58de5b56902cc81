//! Data model shared by the aggregation pass, the quality analyzer and the
//! presentation/export layer.
//!
//! Output structures serialize with camelCase field names; these names are
//! the stable output contract consumed by dashboards and exporters.

use crate::statistics::RunningMean;
use crate::utils::percentage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One input record: string keys mapped to loosely typed cell values.
///
/// Keys are matched case-insensitively after normalization; extra keys are
/// carried through untouched.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The six fields every search-performance dataset must provide.
pub const REQUIRED_FIELDS: [&str; 6] = ["query", "page", "clicks", "impressions", "ctr", "position"];

// ============================================================================
// Classification labels
// ============================================================================

/// Traffic category assigned to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Branded,
    NonBranded,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Branded => "Branded",
            Self::NonBranded => "Non-Branded",
        }
    }
}

/// Coarse content category derived from a page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Blog,
    Product,
    Support,
    About,
    Auth,
    Homepage,
    Other,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Product => "Product",
            Self::Support => "Support",
            Self::About => "About",
            Self::Auth => "Auth",
            Self::Homepage => "Homepage",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregation output
// ============================================================================

/// A row that took part in aggregation, with its derived labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRow {
    /// Position of the row in the input sequence.
    pub index: usize,
    pub query: String,
    pub page: String,
    pub category: Category,
    pub clicks: u64,
    pub impressions: u64,
    /// Click-through rate as a fraction (0.0 - 1.0).
    pub ctr: f64,
    pub position: f64,
    pub content_type: ContentType,
    pub lang: String,
    pub path: String,
    pub primary_path: String,
}

/// Running metrics of one category bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub clicks: u64,
    pub impressions: u64,
    /// `clicks / impressions`, or 0 when there are no impressions.
    pub ctr: f64,
    pub avg_position: f64,
}

/// All rows classified into one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub count: usize,
    pub metrics: Metrics,
    /// The first rows seen for this bucket, in input order.
    pub samples: Vec<ClassifiedRow>,
    #[serde(skip)]
    position_mean: RunningMean,
}

impl CategoryBucket {
    /// Fold one row into the bucket.
    pub fn record(&mut self, row: &ClassifiedRow, sample_limit: usize) {
        self.count += 1;
        self.metrics.clicks += row.clicks;
        self.metrics.impressions += row.impressions;
        self.position_mean.push(row.position);
        self.metrics.avg_position = self.position_mean.mean();

        if self.samples.len() < sample_limit {
            self.samples.push(row.clone());
        }
    }

    /// Compute derived metrics once the pass is complete.
    pub fn finalize(&mut self) {
        self.metrics.ctr = if self.metrics.impressions == 0 {
            0.0
        } else {
            self.metrics.clicks as f64 / self.metrics.impressions as f64
        };
    }
}

/// Branded/non-branded counts for one grouping key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySplit {
    pub total: usize,
    pub branded: usize,
    pub non_branded: usize,
    pub branded_percentage: f64,
    pub non_branded_percentage: f64,
}

impl CategorySplit {
    pub fn record(&mut self, category: Category) {
        self.total += 1;
        match category {
            Category::Branded => self.branded += 1,
            Category::NonBranded => self.non_branded += 1,
        }
    }

    pub fn finalize(&mut self) {
        self.branded_percentage = percentage(self.branded, self.total);
        self.non_branded_percentage = percentage(self.non_branded, self.total);
    }
}

/// A grouping-table row carrying a [`CategorySplit`].
pub trait GroupStat {
    fn split(&self) -> &CategorySplit;
    fn split_mut(&mut self) -> &mut CategorySplit;
}

macro_rules! impl_group_stat {
    ($($ty:ty),*) => {
        $(
            impl GroupStat for $ty {
                fn split(&self) -> &CategorySplit {
                    &self.split
                }

                fn split_mut(&mut self) -> &mut CategorySplit {
                    &mut self.split
                }
            }
        )*
    };
}

/// Statistics for one primary path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStat {
    pub path: String,
    #[serde(flatten)]
    pub split: CategorySplit,
    pub clicks: u64,
}

/// Statistics for one detected language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStat {
    pub lang: String,
    #[serde(flatten)]
    pub split: CategorySplit,
    pub clicks: u64,
}

/// Statistics for one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeStat {
    pub content_type: ContentType,
    #[serde(flatten)]
    pub split: CategorySplit,
    pub clicks: u64,
}

impl_group_stat!(PathStat, LanguageStat, ContentTypeStat);

/// A row whose `(query, page)` pair already appeared earlier in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateEntry {
    pub index: usize,
    pub first_index: usize,
    pub query: String,
    pub page: String,
}

/// Headline counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Every row handed to the pass, including skipped ones.
    pub input_rows: usize,
    /// Rows that were classified and aggregated.
    pub total_rows: usize,
    /// Rows excluded for lacking a query or page.
    pub skipped_rows: usize,
    pub branded_count: usize,
    pub non_branded_count: usize,
    pub branded_percentage: f64,
    pub non_branded_percentage: f64,
    pub duplicate_count: usize,
    pub total_clicks: u64,
    pub total_impressions: u64,
}

/// Everything one aggregation pass produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    /// The key-normalized input, skipped rows included.
    pub data: Vec<Record>,
    pub summary: Summary,
    pub branded: CategoryBucket,
    pub non_branded: CategoryBucket,
    /// Reserved for queries that mention a brand term yet classify as
    /// non-branded. Nothing populates it.
    pub borderline: CategoryBucket,
    pub rows: Vec<ClassifiedRow>,
    pub path_stats: Vec<PathStat>,
    pub path_examples: BTreeMap<String, Vec<String>>,
    pub language_stats: Vec<LanguageStat>,
    pub content_types: Vec<ContentTypeStat>,
    pub duplicates: Vec<DuplicateEntry>,
    pub verification_sample: Vec<Record>,
}

impl AggregatedResult {
    pub fn bucket(&self, category: Category) -> &CategoryBucket {
        match category {
            Category::Branded => &self.branded,
            Category::NonBranded => &self.non_branded,
        }
    }
}

// ============================================================================
// Quality report
// ============================================================================

/// How urgently a quality warning deserves attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    MissingData,
    Outliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub affected_rows: usize,
    pub message: String,
    pub details: serde_json::Value,
}

/// A numeric value far from its field's mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlier {
    pub index: usize,
    pub query: String,
    pub value: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Completeness clamped to `[0, 95]`.
    pub health_score: f64,
    /// Share of present values across the required fields (0 - 100).
    pub completeness: f64,
    pub total_rows: usize,
    pub missing_values: BTreeMap<String, usize>,
    pub outliers: BTreeMap<String, Vec<Outlier>>,
    pub warnings: Vec<Warning>,
}

impl QualityReport {
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }
}

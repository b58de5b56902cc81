//! The single-pass classification and aggregation engine.

use crate::classifier::{BrandMatcher, ContentTypeCache, ContentTypeLookup};
use crate::config::ClassificationConfig;
use crate::segmenter::{PathLanguageSegmenter, PathSegments, UNKNOWN_LANGUAGE};
use crate::types::{
    AggregatedResult, Category, CategorySplit, ClassifiedRow, ContentTypeStat, DuplicateEntry,
    GroupStat, LanguageStat, PathStat, Record, Summary,
};
use crate::utils::{
    coerce_ctr, coerce_impressions, coerce_number, field_text, normalize_keys, percentage,
    to_count,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

/// Rows of a grouping table kept in first-seen order with a key index.
struct Grouped<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Grouped<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn slot(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let position = match self.index.get(key) {
            Some(position) => *position,
            None => {
                self.items.push(make());
                let position = self.items.len() - 1;
                self.index.insert(key.to_string(), position);
                position
            }
        };
        &mut self.items[position]
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Classifies and aggregates search-performance records.
///
/// Each call to [`aggregate`](Self::aggregate) allocates its own buckets,
/// tables and counters, so one engine can serve concurrent callers.
///
/// # Example
///
/// ```rust,ignore
/// use brandlens::{AggregationEngine, ClassificationConfig};
///
/// let config = ClassificationConfig::builder().brand_terms("acme").build()?;
/// let result = AggregationEngine::new(config).aggregate(&records);
/// println!("{:.1}% branded", result.summary.branded_percentage);
/// ```
pub struct AggregationEngine {
    config: ClassificationConfig,
    matcher: BrandMatcher,
    segmenter: PathLanguageSegmenter,
}

impl AggregationEngine {
    pub fn new(config: ClassificationConfig) -> Self {
        let matcher = BrandMatcher::new(&config);
        let segmenter = if config.detect_language {
            PathLanguageSegmenter::new(&config.language_codes)
        } else {
            PathLanguageSegmenter::without_languages()
        };

        Self {
            config,
            matcher,
            segmenter,
        }
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Aggregate `rows` with a content-type memo private to this call.
    pub fn aggregate(&self, rows: &[Record]) -> AggregatedResult {
        let mut cache = ContentTypeCache::new();
        self.aggregate_with_cache(rows, &mut cache)
    }

    /// Aggregate `rows`, resolving content types through `cache`.
    pub fn aggregate_with_cache(
        &self,
        rows: &[Record],
        cache: &mut dyn ContentTypeLookup,
    ) -> AggregatedResult {
        info!("Aggregating {} rows...", rows.len());

        let data: Vec<Record> = rows.iter().map(normalize_keys).collect();

        let mut result = AggregatedResult::default();
        let mut paths: Grouped<PathStat> = Grouped::new();
        let mut languages: Grouped<LanguageStat> = Grouped::new();
        let mut content_types: Grouped<ContentTypeStat> = Grouped::new();
        let mut first_seen: HashMap<(String, String), usize> = HashMap::new();
        let mut skipped = 0usize;

        for (index, record) in data.iter().enumerate() {
            let query = field_text(record, "query");
            let page = field_text(record, "page");

            if query.is_empty() || page.is_empty() {
                debug!("Skipping row {}: missing query or page", index);
                skipped += 1;
                continue;
            }

            let category = if self.matcher.is_branded(&query) {
                Category::Branded
            } else {
                Category::NonBranded
            };

            let PathSegments {
                lang,
                path,
                primary_path,
            } = self.segmenter.resolve(&page);
            let lang = if self.config.detect_language {
                lang
            } else {
                UNKNOWN_LANGUAGE.to_string()
            };

            let row = ClassifiedRow {
                index,
                category,
                clicks: to_count(coerce_number(record.get("clicks"))),
                impressions: to_count(coerce_impressions(record.get("impressions"))),
                ctr: coerce_ctr(record.get("ctr")),
                position: coerce_number(record.get("position")),
                content_type: cache.lookup(&page),
                lang,
                path,
                primary_path,
                query,
                page,
            };

            match category {
                Category::Branded => result.branded.record(&row, self.config.sample_limit),
                Category::NonBranded => result.non_branded.record(&row, self.config.sample_limit),
            }

            let path_stat = paths.slot(&row.primary_path, || PathStat {
                path: row.primary_path.clone(),
                split: CategorySplit::default(),
                clicks: 0,
            });
            path_stat.split.record(category);
            path_stat.clicks += row.clicks;

            let examples = result
                .path_examples
                .entry(row.primary_path.clone())
                .or_default();
            if examples.len() < self.config.path_example_limit && !examples.contains(&row.page) {
                examples.push(row.page.clone());
            }

            if self.config.detect_language {
                let language = languages.slot(&row.lang, || LanguageStat {
                    lang: row.lang.clone(),
                    split: CategorySplit::default(),
                    clicks: 0,
                });
                language.split.record(category);
                language.clicks += row.clicks;
            }

            let content = content_types.slot(row.content_type.as_str(), || ContentTypeStat {
                content_type: row.content_type,
                split: CategorySplit::default(),
                clicks: 0,
            });
            content.split.record(category);
            content.clicks += row.clicks;

            match first_seen.entry((row.query.clone(), row.page.clone())) {
                Entry::Occupied(first) => result.duplicates.push(DuplicateEntry {
                    index,
                    first_index: *first.get(),
                    query: row.query.clone(),
                    page: row.page.clone(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }

            result.rows.push(row);
        }

        result.branded.finalize();
        result.non_branded.finalize();

        result.path_stats = finalize_table(paths.into_items());
        result.language_stats = finalize_table(languages.into_items());
        result.content_types = finalize_table(content_types.into_items());

        let total_rows = result.branded.count + result.non_branded.count;
        result.summary = Summary {
            input_rows: data.len(),
            total_rows,
            skipped_rows: skipped,
            branded_count: result.branded.count,
            non_branded_count: result.non_branded.count,
            branded_percentage: percentage(result.branded.count, total_rows),
            non_branded_percentage: percentage(result.non_branded.count, total_rows),
            duplicate_count: result.duplicates.len(),
            total_clicks: result.branded.metrics.clicks + result.non_branded.metrics.clicks,
            total_impressions: result.branded.metrics.impressions
                + result.non_branded.metrics.impressions,
        };

        result.verification_sample = data
            .iter()
            .take(self.config.verification_sample_size)
            .cloned()
            .collect();
        result.data = data;

        info!(
            "Aggregation complete: {} rows ({} branded, {} non-branded), {} skipped, {} duplicates",
            total_rows,
            result.summary.branded_count,
            result.summary.non_branded_count,
            skipped,
            result.summary.duplicate_count
        );

        result
    }
}

/// Compute percentages and order rows by volume, keeping first-seen order on ties.
fn finalize_table<T: GroupStat>(mut items: Vec<T>) -> Vec<T> {
    for item in items.iter_mut() {
        item.split_mut().finalize();
    }
    items.sort_by_key(|item| std::cmp::Reverse(item.split().total));
    items
}

//! Classification of queries and pages.
//!
//! - [`BrandMatcher`] decides whether a query is branded.
//! - [`ContentTypeClassifier`] maps a page URL to a coarse content category,
//!   memoized through a [`ContentTypeLookup`] cache.

mod brand;
mod content_type;

pub use brand::{
    BrandMatcher, PATTERN_CHUNK_SIZE, PATTERN_SIZE_LIMIT, PATTERN_STEP_LIMIT, PatternOutcome,
    evaluate_budgeted,
};
pub use content_type::{
    ContentTypeCache, ContentTypeClassifier, ContentTypeLookup, SharedContentTypeCache,
};

//! Streaming aggregation of classified search-performance rows.
//!
//! The pass is strictly forward and index-ordered: keys are normalized once,
//! each row is classified, folded into its category bucket and grouping
//! tables, and checked against earlier `(query, page)` pairs. Derived values
//! (CTR, percentages, table order) are computed after the last row.

mod engine;

pub use engine::AggregationEngine;

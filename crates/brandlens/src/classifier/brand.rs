//! Branded-query detection.
//!
//! Term mode is a plain substring test. Pattern mode compiles the user's
//! regular expression once and evaluates it under a step budget: the query
//! is scanned in fixed-size chunks, every chunk and every match inside it
//! costs one step, and the final whole-query test costs one more. Crossing
//! the ceiling aborts the evaluation and the query counts as not branded.
//!
//! The budget is a heuristic guard against patterns that are expensive on
//! long inputs. The `regex` engine itself runs in linear time and rejects
//! oversized programs at compile time, so the budget mainly caps how much
//! work a single very long query can cost.

use crate::config::{ClassificationConfig, MatchMode};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// Characters evaluated per chunk in pattern mode.
pub const PATTERN_CHUNK_SIZE: usize = 100;

/// Step ceiling for one pattern evaluation.
pub const PATTERN_STEP_LIMIT: usize = 1000;

/// Upper bound on the compiled pattern size in bytes.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Result of one budgeted pattern evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOutcome {
    Matched,
    NoMatch,
    /// The step ceiling was crossed before the final test completed.
    BudgetExceeded,
}

#[derive(Debug, Clone)]
enum Strategy {
    Terms(Vec<String>),
    /// `None` when the pattern failed to compile; nothing matches.
    Pattern(Option<Regex>),
}

/// Decides whether a query is branded under one [`ClassificationConfig`].
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    strategy: Strategy,
    case_sensitive: bool,
}

impl BrandMatcher {
    pub fn new(config: &ClassificationConfig) -> Self {
        let strategy = match config.match_mode() {
            MatchMode::Terms => Strategy::Terms(config.brand_term_list()),
            MatchMode::Pattern => {
                Strategy::Pattern(compile_pattern(&config.custom_pattern, config.case_sensitive))
            }
        };

        Self {
            strategy,
            case_sensitive: config.case_sensitive,
        }
    }

    /// Whether the configured pattern failed to compile.
    pub fn has_invalid_pattern(&self) -> bool {
        matches!(self.strategy, Strategy::Pattern(None))
    }

    pub fn is_branded(&self, query: &str) -> bool {
        match &self.strategy {
            Strategy::Terms(terms) => {
                if self.case_sensitive {
                    terms.iter().any(|term| query.contains(term.as_str()))
                } else {
                    let lowered = query.to_lowercase();
                    terms.iter().any(|term| lowered.contains(term.as_str()))
                }
            }
            Strategy::Pattern(None) => false,
            Strategy::Pattern(Some(regex)) => match evaluate_budgeted(regex, query) {
                PatternOutcome::Matched => true,
                PatternOutcome::NoMatch => false,
                PatternOutcome::BudgetExceeded => {
                    debug!(
                        "Pattern evaluation exceeded {} steps for query of {} chars; treating as non-branded",
                        PATTERN_STEP_LIMIT,
                        query.chars().count()
                    );
                    false
                }
            },
        }
    }
}

fn compile_pattern(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .size_limit(PATTERN_SIZE_LIMIT)
        .dfa_size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Invalid brand pattern '{}': {}. No query will match.", pattern, e);
            None
        }
    }
}

/// Evaluate `regex` against `query` within [`PATTERN_STEP_LIMIT`] steps.
pub fn evaluate_budgeted(regex: &Regex, query: &str) -> PatternOutcome {
    let mut steps = 0usize;

    let boundaries: Vec<usize> = query
        .char_indices()
        .map(|(i, _)| i)
        .step_by(PATTERN_CHUNK_SIZE)
        .chain(std::iter::once(query.len()))
        .collect();

    for window in boundaries.windows(2) {
        let chunk = &query[window[0]..window[1]];
        steps += 1;
        if steps > PATTERN_STEP_LIMIT {
            return PatternOutcome::BudgetExceeded;
        }
        for _ in regex.find_iter(chunk) {
            steps += 1;
            if steps > PATTERN_STEP_LIMIT {
                return PatternOutcome::BudgetExceeded;
            }
        }
    }

    steps += 1;
    if steps > PATTERN_STEP_LIMIT {
        return PatternOutcome::BudgetExceeded;
    }

    if regex.is_match(query) {
        PatternOutcome::Matched
    } else {
        PatternOutcome::NoMatch
    }
}

//! Configuration types for a classification run.
//!
//! A [`ClassificationConfig`] is immutable for the duration of one analysis.
//! Build it with [`ClassificationConfig::builder()`], or deserialize it from
//! JSON (field names are camelCase, e.g. `brandTerms`, `useCustomPattern`).

use crate::segmenter::DEFAULT_LANGUAGE_CODES;
use serde::{Deserialize, Serialize};

/// Default number of sample rows retained per category bucket.
pub const DEFAULT_SAMPLE_LIMIT: usize = 10;

/// Default number of example URLs retained per primary path.
pub const DEFAULT_PATH_EXAMPLE_LIMIT: usize = 10;

/// Default number of normalized rows echoed back for verification.
pub const DEFAULT_VERIFICATION_SAMPLE_SIZE: usize = 50;

/// How queries are tested for brand membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Substring match against the comma-separated brand term list.
    Terms,
    /// User-supplied regular expression, evaluated under a step budget.
    Pattern,
}

/// Configuration for one classification and aggregation run.
///
/// # Example
///
/// ```rust,ignore
/// use brandlens::ClassificationConfig;
///
/// let config = ClassificationConfig::builder()
///     .brand_terms("acme, acme corp")
///     .detect_language(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassificationConfig {
    /// Comma-separated brand terms, e.g. `"acme, acme corp"`.
    pub brand_terms: String,

    /// Use `custom_pattern` instead of the term list.
    pub use_custom_pattern: bool,

    /// Regular expression used when `use_custom_pattern` is set.
    pub custom_pattern: String,

    /// Match terms and pattern case-sensitively.
    /// Default: false
    pub case_sensitive: bool,

    /// Resolve a language code from the first matching path segment.
    /// Default: true
    pub detect_language: bool,

    /// Path segments recognized as language codes (compared case-insensitively).
    pub language_codes: Vec<String>,

    /// Maximum sample records kept per category bucket.
    /// Default: 10
    pub sample_limit: usize,

    /// Maximum distinct example URLs kept per primary path.
    /// Default: 10
    pub path_example_limit: usize,

    /// Number of normalized rows returned as a verification sample.
    /// Default: 50
    pub verification_sample_size: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            brand_terms: String::new(),
            use_custom_pattern: false,
            custom_pattern: String::new(),
            case_sensitive: false,
            detect_language: true,
            language_codes: DEFAULT_LANGUAGE_CODES
                .iter()
                .map(|code| code.to_string())
                .collect(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            path_example_limit: DEFAULT_PATH_EXAMPLE_LIMIT,
            verification_sample_size: DEFAULT_VERIFICATION_SAMPLE_SIZE,
        }
    }
}

impl ClassificationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClassificationConfigBuilder {
        ClassificationConfigBuilder::default()
    }

    /// The active matching mode.
    pub fn match_mode(&self) -> MatchMode {
        if self.use_custom_pattern {
            MatchMode::Pattern
        } else {
            MatchMode::Terms
        }
    }

    /// Brand terms split on commas and trimmed, with empty entries dropped.
    ///
    /// Terms are lower-cased unless matching is case-sensitive.
    pub fn brand_term_list(&self) -> Vec<String> {
        self.brand_terms
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| {
                if self.case_sensitive {
                    term.to_string()
                } else {
                    term.to_lowercase()
                }
            })
            .collect()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match self.match_mode() {
            MatchMode::Pattern if self.custom_pattern.trim().is_empty() => {
                return Err(ConfigValidationError::EmptyPattern);
            }
            MatchMode::Terms if self.brand_term_list().is_empty() => {
                return Err(ConfigValidationError::NoBrandTerms);
            }
            _ => {}
        }

        if let Some(code) = self
            .language_codes
            .iter()
            .find(|code| code.trim().is_empty() || code.contains('/'))
        {
            return Err(ConfigValidationError::InvalidLanguageCode(code.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Custom pattern mode is enabled but the pattern is empty")]
    EmptyPattern,

    #[error("No brand terms provided (expected a comma-separated list)")]
    NoBrandTerms,

    #[error("Invalid language code: '{0}' (must be a non-empty path segment)")]
    InvalidLanguageCode(String),
}

/// Builder for [`ClassificationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ClassificationConfigBuilder {
    brand_terms: Option<String>,
    custom_pattern: Option<String>,
    case_sensitive: Option<bool>,
    detect_language: Option<bool>,
    language_codes: Option<Vec<String>>,
    sample_limit: Option<usize>,
    path_example_limit: Option<usize>,
    verification_sample_size: Option<usize>,
}

impl ClassificationConfigBuilder {
    /// Set the comma-separated brand term list.
    pub fn brand_terms(mut self, terms: impl Into<String>) -> Self {
        self.brand_terms = Some(terms.into());
        self
    }

    /// Switch to pattern mode with the given regular expression.
    pub fn custom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_pattern = Some(pattern.into());
        self
    }

    /// Set whether matching is case-sensitive.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = Some(enabled);
        self
    }

    /// Set whether language codes are resolved from URL paths.
    pub fn detect_language(mut self, enabled: bool) -> Self {
        self.detect_language = Some(enabled);
        self
    }

    /// Replace the recognized language codes.
    pub fn language_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.language_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Set the per-bucket sample limit.
    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    /// Set the per-path example URL limit.
    pub fn path_example_limit(mut self, limit: usize) -> Self {
        self.path_example_limit = Some(limit);
        self
    }

    /// Set the verification sample size.
    pub fn verification_sample_size(mut self, size: usize) -> Self {
        self.verification_sample_size = Some(size);
        self
    }

    /// Build the configuration, validating all values.
    pub fn build(self) -> Result<ClassificationConfig, ConfigValidationError> {
        let defaults = ClassificationConfig::default();

        let config = ClassificationConfig {
            brand_terms: self.brand_terms.unwrap_or(defaults.brand_terms),
            use_custom_pattern: self.custom_pattern.is_some(),
            custom_pattern: self.custom_pattern.unwrap_or(defaults.custom_pattern),
            case_sensitive: self.case_sensitive.unwrap_or(defaults.case_sensitive),
            detect_language: self.detect_language.unwrap_or(defaults.detect_language),
            language_codes: self.language_codes.unwrap_or(defaults.language_codes),
            sample_limit: self.sample_limit.unwrap_or(defaults.sample_limit),
            path_example_limit: self
                .path_example_limit
                .unwrap_or(defaults.path_example_limit),
            verification_sample_size: self
                .verification_sample_size
                .unwrap_or(defaults.verification_sample_size),
        };

        config.validate()?;
        Ok(config)
    }
}

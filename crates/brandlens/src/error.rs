//! Custom error types for the classification pipeline.
//!
//! Only dataset-level rejections and infrastructure failures surface as
//! [`AnalysisError`]. Row skips, URL fallbacks and pattern aborts are
//! degradations recorded in the result and never reach this type.
//!
//! Errors are serializable so they can be handed to a frontend or written
//! into a JSON report as `{ code, message }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The dataset has no rows at all.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// One or more expected columns are absent from the header.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// One or more expected columns have no value in any row.
    #[error("Required columns contain no data: {}", .0.join(", "))]
    EmptyColumns(Vec<String>),

    /// A cell carries markup or script that must not be processed.
    #[error("Potentially malicious content in row {row}, column '{column}' (matched '{marker}')")]
    MaliciousContent {
        row: usize,
        column: String,
        marker: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing an export file failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::EmptyColumns(_) => "EMPTY_COLUMNS",
            Self::MaliciousContent { .. } => "MALICIOUS_CONTENT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Export(_) => "EXPORT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error refuses the dataset before aggregation starts.
    ///
    /// These are the only failures a user is expected to act on by fixing
    /// the uploaded file.
    pub fn is_dataset_rejection(&self) -> bool {
        match self {
            Self::EmptyDataset
            | Self::MissingColumns(_)
            | Self::EmptyColumns(_)
            | Self::MaliciousContent { .. } => true,
            Self::WithContext { source, .. } => source.is_dataset_rejection(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for AnalysisError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(AnalysisError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            AnalysisError::MissingColumns(vec!["ctr".to_string()]).error_code(),
            "MISSING_COLUMNS"
        );
    }

    #[test]
    fn test_missing_columns_message_lists_all() {
        let error = AnalysisError::MissingColumns(vec!["ctr".to_string(), "position".to_string()]);
        assert_eq!(error.to_string(), "Missing required columns: ctr, position");
    }

    #[test]
    fn test_is_dataset_rejection() {
        assert!(AnalysisError::EmptyDataset.is_dataset_rejection());
        assert!(
            AnalysisError::MaliciousContent {
                row: 0,
                column: "query".to_string(),
                marker: "<script".to_string(),
            }
            .is_dataset_rejection()
        );
        assert!(!AnalysisError::InvalidConfig("bad".to_string()).is_dataset_rejection());
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::EmptyColumns(vec!["impressions".to_string()]);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("EMPTY_COLUMNS"));
        assert!(json.contains("impressions"));
    }

    #[test]
    fn test_from_config_validation_error() {
        let error: AnalysisError = crate::config::ConfigValidationError::NoBrandTerms.into();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_with_context() {
        let error = AnalysisError::EmptyDataset.with_context("During validation");
        assert!(error.to_string().contains("During validation"));
        assert_eq!(error.error_code(), "EMPTY_DATASET");
        assert!(error.is_dataset_rejection());
    }
}

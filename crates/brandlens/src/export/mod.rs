//! Export boundary: sanitization guards and CSV table writers.

mod sanitizers;
mod writer;

pub use sanitizers::{
    FORMULA_NEUTRALIZER, FORMULA_TRIGGERS, find_executable_marker, sanitize_cell, sanitize_html,
    validate_content,
};
pub use writer::{CsvExporter, ExportKind};

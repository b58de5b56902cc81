//! Ingestion: reading CSV files into records and refusing unusable datasets.

mod loader;
mod validation;

pub use loader::{clean_csv_content, load_csv, load_csv_from_str, records_from_dataframe};
pub use validation::validate_dataset;

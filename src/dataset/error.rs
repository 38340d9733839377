use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Data file not found: '{0}'")]
    MissingFile(PathBuf),

    #[error("Failed to parse CSV file '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in the {table} table")]
    MissingColumn {
        table: String,
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Month value {0} outside the valid range 1-12")]
    InvalidMonth(i64),

    #[error("Month column contains a null value in the {0} table")]
    NullMonth(String),

    #[error("Failed deriving the Month_Name column for the {table} table")]
    MonthDerivation {
        table: String,
        #[source]
        source: PolarsError,
    },
}

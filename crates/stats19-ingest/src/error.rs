//! Error types for extract ingestion.

use std::path::PathBuf;

use stats19_model::TableKind;
use thiserror::Error;

/// Errors that can occur while reading the source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Data directory not found or not a directory.
    #[error("data directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Extract file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Table Errors ===
    /// No table registered for a year and kind.
    #[error("no {kind} table for {year}")]
    TableNotFound { year: i32, kind: TableKind },

    /// Key column absent from a source table.
    #[error("required column '{column}' not found in {kind} table for {year}")]
    MissingColumn {
        column: String,
        kind: TableKind,
        year: i32,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/vehicle.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/vehicle.csv");

        let err = IngestError::MissingColumn {
            column: "vehicle_reference".to_string(),
            kind: TableKind::Casualty,
            year: 2020,
        };
        assert_eq!(
            err.to_string(),
            "required column 'vehicle_reference' not found in casualty table for 2020"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}

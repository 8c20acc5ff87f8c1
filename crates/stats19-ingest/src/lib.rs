//! Ingestion of the national road casualty statistics extract.
//!
//! Tables come from a [`TableSource`], are projected through the per-table
//! drop lists, get their accident references normalized and are converted to
//! the typed records of `stats19-model`.
//!
//! # Example
//!
//! ```ignore
//! use stats19_ingest::{CsvTableSource, load_year};
//!
//! let source = CsvTableSource::new("data");
//! let tables = load_year(&source, 2021)?;
//! println!("{} vehicles", tables.vehicles.len());
//! ```

mod csv;
mod error;
mod keys;
mod load;
mod records;
mod select;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === Sources ===
pub use csv::{canonical_header, read_csv_text};
pub use source::{CsvTableSource, InMemoryTableSource, TableSource};

// === Table Preparation ===
pub use keys::{normalize_accident_reference, normalize_key_column};
pub use select::{
    ACCIDENT_DROPPED_COLUMNS, CASUALTY_DROPPED_COLUMNS, VEHICLE_DROPPED_COLUMNS, dropped_columns,
    select_columns,
};

// === Records ===
pub use load::{YearTables, load_year, prepare_table};
pub use records::{
    ACCIDENT_REFERENCE, VEHICLE_REFERENCE, accident_records, casualty_records, vehicle_records,
};

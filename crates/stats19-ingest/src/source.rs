//! Where raw tables come from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use stats19_model::TableKind;
use stats19_model::options::DEFAULT_FILE_TEMPLATE;

use crate::csv::read_csv_text;
use crate::error::{IngestError, Result};

/// Produces one raw table per (year, kind) as a frame of named fields.
pub trait TableSource {
    fn read_table(&self, year: i32, kind: TableKind) -> Result<DataFrame>;
}

/// Reads the published CSV files from a data directory.
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    data_dir: PathBuf,
    file_template: String,
}

impl CsvTableSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
        }
    }

    /// Overrides the file name template; `{kind}` and `{year}` are substituted.
    pub fn with_file_template(mut self, template: impl Into<String>) -> Self {
        self.file_template = template.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Checks the data directory up front so a typo fails before any year is read.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if self.data_dir.is_dir() {
            Ok(())
        } else {
            Err(IngestError::DirectoryNotFound {
                path: self.data_dir.clone(),
            })
        }
    }

    pub fn path_for(&self, year: i32, kind: TableKind) -> PathBuf {
        let file_name = self
            .file_template
            .replace("{kind}", kind.as_str())
            .replace("{year}", &year.to_string());
        self.data_dir.join(file_name)
    }
}

impl TableSource for CsvTableSource {
    fn read_table(&self, year: i32, kind: TableKind) -> Result<DataFrame> {
        let path = self.path_for(year, kind);
        tracing::debug!(year, kind = %kind, path = %path.display(), "reading table");
        read_csv_text(&path)
    }
}

/// Tables held in memory, keyed by (year, kind).
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableSource {
    tables: BTreeMap<(i32, TableKind), DataFrame>,
}

impl InMemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, kind: TableKind, df: DataFrame) {
        self.tables.insert((year, kind), df);
    }

    pub fn with_table(mut self, year: i32, kind: TableKind, df: DataFrame) -> Self {
        self.insert(year, kind, df);
        self
    }

    /// Years with at least one registered table, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.tables.keys().map(|(year, _)| *year).collect();
        years.dedup();
        years
    }
}

impl TableSource for InMemoryTableSource {
    fn read_table(&self, year: i32, kind: TableKind) -> Result<DataFrame> {
        self.tables
            .get(&(year, kind))
            .cloned()
            .ok_or(IngestError::TableNotFound { year, kind })
    }
}

//! Persisting the model frame: a CSV dataset and its JSON schema sidecar.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use stats19_model::MissingMarker;
use stats19_transform::ModelFrame;
use tracing::{info, info_span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dataset: PathBuf,
    pub schema: PathBuf,
}

/// `<output>.schema.json` next to the dataset.
pub fn schema_sidecar_path(dataset: &Path) -> PathBuf {
    let mut name = dataset.as_os_str().to_owned();
    name.push(".schema.json");
    PathBuf::from(name)
}

/// Renders missing cells according to `marker`.
pub fn apply_missing_marker(df: &DataFrame, marker: MissingMarker) -> PolarsResult<DataFrame> {
    match marker {
        MissingMarker::Null => Ok(df.clone()),
        MissingMarker::Sentinel => {
            let exprs: Vec<Expr> = df
                .get_column_names()
                .iter()
                .map(|name| col(name.as_str()).fill_null(lit(MissingMarker::SENTINEL_VALUE)))
                .collect();
            df.clone().lazy().with_columns(exprs).collect()
        }
    }
}

/// Writes the dataset CSV and the schema sidecar, creating parent
/// directories as needed.
pub fn write_outputs(
    model: &ModelFrame,
    dataset: &Path,
    marker: MissingMarker,
) -> Result<OutputPaths> {
    let span = info_span!("write", path = %dataset.display());
    let _guard = span.enter();

    if let Some(parent) = dataset.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }

    let mut df = apply_missing_marker(&model.data, marker).context("apply missing marker")?;
    let mut file =
        File::create(dataset).with_context(|| format!("create {}", dataset.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)
        .with_context(|| format!("write {}", dataset.display()))?;

    let schema = schema_sidecar_path(dataset);
    let json = serde_json::to_string_pretty(&model.schema_report())?;
    fs::write(&schema, format!("{json}\n"))
        .with_context(|| format!("write {}", schema.display()))?;

    info!(
        rows = df.height(),
        columns = df.width(),
        schema = %schema.display(),
        "wrote dataset"
    );
    Ok(OutputPaths {
        dataset: dataset.to_path_buf(),
        schema,
    })
}

//! Configuration options for a pipeline run.
//!
//! Every struct is `#[serde(default)]` so a configuration file only needs to
//! name the fields it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::FeatureSchema;

/// File name template of the published extract. `{kind}` and `{year}` are
/// substituted per table.
pub const DEFAULT_FILE_TEMPLATE: &str = "dft-road-casualty-statistics-{kind}-{year}.csv";

/// How missing values are rendered in the persisted dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMarker {
    /// Empty cells; tree learners treat them as native missing values.
    #[default]
    Null,
    /// `-1`, distinguishable from a valid zero.
    Sentinel,
}

impl MissingMarker {
    pub const SENTINEL_VALUE: i64 = -1;
}

/// Casualty aggregation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationOptions {
    /// Add mean casualty age and male share per vehicle.
    pub include_auxiliary_aggregates: bool,
    /// Ignore passengers of the vehicle itself when picking the struck-object
    /// category.
    pub exclude_passengers_from_modal_type: bool,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            include_auxiliary_aggregates: false,
            exclude_passengers_from_modal_type: true,
        }
    }
}

/// Imputation split and booster parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationOptions {
    pub seed: u64,
    /// Share of labelled rows held out for early stopping.
    pub validation_fraction: f64,
    pub early_stopping_rounds: usize,
    pub max_rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub max_bins: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
}

impl Default for ImputationOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            validation_fraction: 0.2,
            early_stopping_rounds: 10,
            max_rounds: 200,
            learning_rate: 0.1,
            max_depth: 3,
            max_bins: 32,
            min_samples_leaf: 5,
            l2_regularization: 1.0,
        }
    }
}

/// Replacement column lists for the declared output schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOverrides {
    pub categorical: Option<Vec<String>>,
    pub numerical: Option<Vec<String>>,
}

/// Options controlling a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Year partitions, processed in ascending order.
    pub years: Vec<i32>,
    pub data_dir: PathBuf,
    pub file_template: String,
    /// Output CSV path. The schema sidecar is written next to it.
    pub output: Option<PathBuf>,
    pub missing_marker: MissingMarker,
    pub aggregation: AggregationOptions,
    pub imputation: ImputationOptions,
    pub schema: SchemaOverrides,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            years: vec![2019, 2020, 2021],
            data_dir: PathBuf::from("data"),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            output: None,
            missing_marker: MissingMarker::default(),
            aggregation: AggregationOptions::default(),
            imputation: ImputationOptions::default(),
            schema: SchemaOverrides::default(),
        }
    }
}

impl PipelineOptions {
    /// Years sorted ascending with duplicates removed.
    pub fn ordered_years(&self) -> Vec<i32> {
        let mut years = self.years.clone();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Declared output schema after applying overrides.
    pub fn feature_schema(&self) -> FeatureSchema {
        let mut schema =
            FeatureSchema::with_auxiliary(self.aggregation.include_auxiliary_aggregates);
        if let Some(categorical) = &self.schema.categorical {
            schema.categorical = categorical.clone();
        }
        if let Some(numerical) = &self.schema.numerical {
            schema.numerical = numerical.clone();
        }
        schema
    }
}

//! Declared categorical/numerical split of the final columns.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use stats19_common::code_column;
use stats19_model::{ColumnRole, FeatureSchema};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::frame::ModelFrame;

fn cast(df: &DataFrame, name: &str, dtype: &DataType, expected: &'static str) -> Result<Column> {
    let column = df.column(name).map_err(|_| SchemaError::MissingColumn {
        column: name.to_string(),
    })?;
    let cast = column
        .strict_cast(dtype)
        .map_err(|_| SchemaError::InvalidType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
            expected,
        })?;
    Ok(cast)
}

/// Narrows `df` to the declared columns and fixes their types.
///
/// Categorical columns (and the target) become `Int64` with their sorted
/// distinct codes recorded as levels; numerical columns become `Float64`.
/// The first declared column the frame lacks fails the whole step.
pub fn partition(df: &DataFrame, schema: &FeatureSchema) -> Result<ModelFrame> {
    schema.validate()?;
    for (name, _) in schema.columns() {
        if df.column(name).is_err() {
            return Err(SchemaError::MissingColumn {
                column: name.to_string(),
            }
            .into());
        }
    }

    let mut columns = Vec::with_capacity(schema.column_count());
    let mut levels = BTreeMap::new();
    for (name, role) in schema.columns() {
        let column = match role {
            ColumnRole::Categorical | ColumnRole::Target => {
                cast(df, name, &DataType::Int64, "Int64")?
            }
            ColumnRole::Numerical => cast(df, name, &DataType::Float64, "Float64")?,
        };
        if role == ColumnRole::Categorical {
            levels.insert(name.to_string(), distinct_codes(df, name)?);
        }
        columns.push(column);
    }

    let data = DataFrame::new(columns)?;
    debug!(
        rows = data.height(),
        categorical = schema.categorical.len(),
        numerical = schema.numerical.len(),
        "partitioned feature frame"
    );
    Ok(ModelFrame {
        data,
        schema: schema.clone(),
        levels,
    })
}

/// Sorted distinct non-null codes of `name`.
pub fn distinct_codes(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let codes: BTreeSet<i64> = code_column(df, name)?.into_iter().flatten().collect();
    Ok(codes.into_iter().collect())
}

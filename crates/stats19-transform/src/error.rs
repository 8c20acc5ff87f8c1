//! Error types for the transform stages.

use stats19_model::ModelError;
use thiserror::Error;

/// Final frame does not match the declared schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("declared column '{column}' is not produced by the feature frame")]
    MissingColumn { column: String },
    #[error("column '{column}' of type {dtype} cannot be cast to {expected}")]
    InvalidType {
        column: String,
        dtype: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

//! Error types for the imputation step.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImputeError {
    /// A label class is too small to appear on both sides of the split.
    #[error(
        "label class {class} has {count} labelled row(s); stratified splitting needs at least 2"
    )]
    Stratification { class: i64, count: usize },

    /// Rows need a label but none carry one to learn from.
    #[error("{missing} row(s) need imputation but no row has a label")]
    NoLabelledRows { missing: usize },

    #[error("label column '{column}' not found in the model frame")]
    MissingLabel { column: String },

    #[error("feature matrix has {got} row(s), expected {expected}")]
    RowMismatch { expected: usize, got: usize },

    #[error("classifier was fitted on {expected} feature(s), got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("invalid imputation option: {message}")]
    InvalidOptions { message: String },

    #[error("classifier used before fit")]
    NotFitted,

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ImputeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratification_message_names_class() {
        let err = ImputeError::Stratification { class: 18, count: 1 };
        assert_eq!(
            err.to_string(),
            "label class 18 has 1 labelled row(s); stratified splitting needs at least 2"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let err: ImputeError =
            polars::prelude::PolarsError::ColumnNotFound("casualty_modal_type".into()).into();
        assert!(matches!(err, ImputeError::DataFrame { .. }));
    }
}

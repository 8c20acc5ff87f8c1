//! The classifier seam used by the imputation step.

use serde::Serialize;

use crate::dataset::{Dataset, FeatureMatrix};
use crate::error::Result;

/// Outcome of one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub classes: Vec<i64>,
    pub train_rows: usize,
    pub validation_rows: usize,
    /// Boosting rounds actually run before stopping.
    pub rounds: usize,
    /// Rounds kept in the final model.
    pub best_iteration: usize,
    pub validation_error: f64,
}

/// A multiclass classifier over integer label codes.
pub trait Classifier {
    /// Trains on `train`, stopping once the error on `validation` has not
    /// improved for `early_stopping_rounds` rounds.
    fn fit(
        &mut self,
        train: &Dataset,
        validation: &Dataset,
        early_stopping_rounds: usize,
    ) -> Result<FitReport>;

    /// One label code per row of `features`.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<i64>>;

    fn evaluate(&self, dataset: &Dataset) -> Result<f64> {
        let predicted = self.predict(&dataset.features)?;
        Ok(multiclass_error(&predicted, &dataset.labels))
    }
}

/// Share of positions where `predicted` and `actual` disagree.
pub fn multiclass_error(predicted: &[i64], actual: &[i64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let wrong = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p != a)
        .count();
    wrong as f64 / actual.len() as f64
}

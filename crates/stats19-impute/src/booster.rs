//! Softmax gradient-boosted trees.

use std::collections::BTreeMap;

use stats19_model::ImputationOptions;
use tracing::{debug, trace};

use crate::classifier::{Classifier, FitReport};
use crate::dataset::{BinMapper, BinnedMatrix, Dataset, FeatureMatrix};
use crate::error::{ImputeError, Result};
use crate::tree::{GrowContext, Tree, TreeParams};

const MIN_HESSIAN: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct BoosterParams {
    pub max_rounds: usize,
    pub learning_rate: f64,
    pub max_bins: usize,
    pub tree: TreeParams,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self::from(&ImputationOptions::default())
    }
}

impl From<&ImputationOptions> for BoosterParams {
    fn from(options: &ImputationOptions) -> Self {
        Self {
            max_rounds: options.max_rounds,
            learning_rate: options.learning_rate,
            max_bins: options.max_bins,
            tree: TreeParams {
                max_depth: options.max_depth,
                min_samples_leaf: options.min_samples_leaf,
                l2_regularization: options.l2_regularization,
                ..TreeParams::default()
            },
        }
    }
}

impl BoosterParams {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.tree.max_depth = depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, rows: usize) -> Self {
        self.tree.min_samples_leaf = rows;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_bins < 2 {
            return Err(ImputeError::InvalidOptions {
                message: format!("max_bins must be at least 2, got {}", self.max_bins),
            });
        }
        if !(self.learning_rate > 0.0) {
            return Err(ImputeError::InvalidOptions {
                message: format!("learning_rate must be positive, got {}", self.learning_rate),
            });
        }
        if self.tree.l2_regularization < 0.0 {
            return Err(ImputeError::InvalidOptions {
                message: "l2_regularization must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct FittedModel {
    classes: Vec<i64>,
    mappers: Vec<BinMapper>,
    base_scores: Vec<f64>,
    /// One tree per class for every kept round.
    rounds: Vec<Vec<Tree>>,
}

impl FittedModel {
    fn scores(&self, binned: &BinnedMatrix, learning_rate: f64) -> Vec<Vec<f64>> {
        let mut scores = vec![self.base_scores.clone(); binned.rows];
        for trees in &self.rounds {
            add_round(&mut scores, trees, binned, learning_rate);
        }
        scores
    }
}

/// Multiclass boosting with one regression tree per class and round.
///
/// Features are binned once from the training rows. Missing values keep
/// their own bin and each split sends them to whichever side lowers the loss.
#[derive(Debug, Clone, Default)]
pub struct GradientBoostedTrees {
    params: BoosterParams,
    model: Option<FittedModel>,
}

impl GradientBoostedTrees {
    pub fn new(params: BoosterParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Rounds kept after early stopping.
    pub fn round_count(&self) -> usize {
        self.model.as_ref().map_or(0, |model| model.rounds.len())
    }

    pub fn classes(&self) -> &[i64] {
        self.model
            .as_ref()
            .map(|model| model.classes.as_slice())
            .unwrap_or(&[])
    }
}

fn add_round(scores: &mut [Vec<f64>], trees: &[Tree], binned: &BinnedMatrix, learning_rate: f64) {
    for (row, row_scores) in scores.iter_mut().enumerate() {
        for (class, tree) in trees.iter().enumerate() {
            row_scores[class] += learning_rate * tree.predict(binned, row);
        }
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|value| value / total).collect()
}

/// Index of the highest score; the lowest index wins ties.
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (idx, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = idx;
        }
    }
    best
}

fn error_rate(scores: &[Vec<f64>], targets: &[usize]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let wrong = scores
        .iter()
        .zip(targets)
        .filter(|(row, target)| argmax(row) != **target)
        .count();
    wrong as f64 / targets.len() as f64
}

fn class_indices(labels: &[i64], classes: &[i64]) -> Vec<Option<usize>> {
    labels
        .iter()
        .map(|label| classes.binary_search(label).ok())
        .collect()
}

impl Classifier for GradientBoostedTrees {
    fn fit(
        &mut self,
        train: &Dataset,
        validation: &Dataset,
        early_stopping_rounds: usize,
    ) -> Result<FitReport> {
        self.params.validate()?;
        if train.is_empty() {
            return Err(ImputeError::EmptyTrainingSet);
        }
        let features = &train.features;
        if validation.features.feature_count() != features.feature_count() {
            return Err(ImputeError::FeatureMismatch {
                expected: features.feature_count(),
                got: validation.features.feature_count(),
            });
        }

        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for label in &train.labels {
            *counts.entry(*label).or_insert(0) += 1;
        }
        let classes: Vec<i64> = counts.keys().copied().collect();
        let n = train.len() as f64;
        let base_scores: Vec<f64> = counts.values().map(|count| (*count as f64 / n).ln()).collect();

        let mappers: Vec<BinMapper> = (0..features.feature_count())
            .map(|feature| {
                BinMapper::fit(
                    features.kinds[feature],
                    features.column(feature),
                    self.params.max_bins,
                )
            })
            .collect();
        let bin_counts: Vec<usize> = mappers.iter().map(BinMapper::bin_count).collect();
        let categorical: Vec<bool> = mappers.iter().map(BinMapper::is_categorical).collect();

        let train_bins = BinnedMatrix::from_features(features, &mappers);
        let valid_bins = BinnedMatrix::from_features(&validation.features, &mappers);
        // every training label is a class by construction
        let train_targets: Vec<usize> = class_indices(&train.labels, &classes)
            .into_iter()
            .flatten()
            .collect();
        // validation labels unseen in training can never be predicted
        let valid_targets: Vec<usize> = class_indices(&validation.labels, &classes)
            .into_iter()
            .map(|idx| idx.unwrap_or(usize::MAX))
            .collect();

        let mut model = FittedModel {
            classes: classes.clone(),
            mappers,
            base_scores,
            rounds: Vec::new(),
        };
        let mut train_scores = model.scores(&train_bins, self.params.learning_rate);
        let mut valid_scores = model.scores(&valid_bins, self.params.learning_rate);
        let monitor_train = validation.is_empty();

        let mut best_error = if monitor_train {
            error_rate(&train_scores, &train_targets)
        } else {
            error_rate(&valid_scores, &valid_targets)
        };
        let mut best_iteration = 0;
        let mut rounds_run = 0;

        if classes.len() > 1 {
            let rows: Vec<usize> = (0..train.len()).collect();
            let mut grad = vec![0.0; train.len()];
            let mut hess = vec![0.0; train.len()];

            for round in 0..self.params.max_rounds {
                let probs: Vec<Vec<f64>> = train_scores.iter().map(|row| softmax(row)).collect();
                let mut trees = Vec::with_capacity(classes.len());
                for class in 0..classes.len() {
                    for (row, p) in probs.iter().enumerate() {
                        let y = if train_targets[row] == class { 1.0 } else { 0.0 };
                        grad[row] = p[class] - y;
                        hess[row] = (p[class] * (1.0 - p[class])).max(MIN_HESSIAN);
                    }
                    let ctx = GrowContext {
                        binned: &train_bins,
                        bin_counts: &bin_counts,
                        categorical: &categorical,
                        grad: &grad,
                        hess: &hess,
                        params: &self.params.tree,
                    };
                    trees.push(Tree::grow(&ctx, rows.clone()));
                }

                add_round(&mut train_scores, &trees, &train_bins, self.params.learning_rate);
                add_round(&mut valid_scores, &trees, &valid_bins, self.params.learning_rate);
                model.rounds.push(trees);
                rounds_run = round + 1;

                let error = if monitor_train {
                    error_rate(&train_scores, &train_targets)
                } else {
                    error_rate(&valid_scores, &valid_targets)
                };
                trace!(round = rounds_run, error, "boosting round");

                if error < best_error {
                    best_error = error;
                    best_iteration = rounds_run;
                } else if rounds_run - best_iteration >= early_stopping_rounds.max(1) {
                    break;
                }
            }
            model.rounds.truncate(best_iteration);
        }

        debug!(
            classes = classes.len(),
            rounds = rounds_run,
            best_iteration,
            validation_error = best_error,
            "fitted gradient-boosted trees"
        );
        self.model = Some(model);
        Ok(FitReport {
            classes,
            train_rows: train.len(),
            validation_rows: validation.len(),
            rounds: rounds_run,
            best_iteration,
            validation_error: best_error,
        })
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<i64>> {
        let model = self.model.as_ref().ok_or(ImputeError::NotFitted)?;
        if features.feature_count() != model.mappers.len() {
            return Err(ImputeError::FeatureMismatch {
                expected: model.mappers.len(),
                got: features.feature_count(),
            });
        }
        let binned = BinnedMatrix::from_features(features, &model.mappers);
        let scores = model.scores(&binned, self.params.learning_rate);
        Ok(scores
            .iter()
            .map(|row| model.classes[argmax(row)])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureKind;

    fn dataset(rows: &[(Option<f64>, Option<f64>, i64)]) -> Dataset {
        let features = FeatureMatrix::new(
            vec!["speed".to_string(), "kind".to_string()],
            vec![FeatureKind::Numeric, FeatureKind::Categorical],
            vec![
                rows.iter().map(|row| row.0).collect(),
                rows.iter().map(|row| row.1).collect(),
            ],
        )
        .unwrap();
        Dataset::new(features, rows.iter().map(|row| row.2).collect()).unwrap()
    }

    fn separable(copies: usize) -> Dataset {
        let mut rows = Vec::new();
        for i in 0..copies {
            let jitter = i as f64;
            rows.push((Some(10.0 + jitter), Some(1.0), 9));
            rows.push((Some(60.0 + jitter), Some(2.0), 11));
            rows.push((None, Some(3.0), 19));
        }
        dataset(&rows)
    }

    fn params() -> BoosterParams {
        BoosterParams::default()
            .with_min_samples_leaf(1)
            .with_max_rounds(50)
            .with_learning_rate(0.3)
    }

    #[test]
    fn test_learns_separable_classes() {
        let train = separable(10);
        let valid = separable(3);
        let mut booster = GradientBoostedTrees::new(params());
        assert!(!booster.is_fitted());
        let report = booster.fit(&train, &valid, 5).unwrap();

        assert!(booster.is_fitted());
        assert_eq!(booster.classes(), &[9, 11, 19]);
        assert_eq!(report.classes, vec![9, 11, 19]);
        assert_eq!(report.validation_error, 0.0);
        assert!(report.best_iteration >= 1);
        assert_eq!(booster.round_count(), report.best_iteration);
        assert_eq!(booster.predict(&valid.features).unwrap(), valid.labels);
        assert_eq!(booster.evaluate(&valid).unwrap(), 0.0);
    }

    #[test]
    fn test_early_stopping_keeps_best_round() {
        let train = separable(10);
        let valid = separable(2);
        let mut booster = GradientBoostedTrees::new(params().with_max_rounds(200));
        let report = booster.fit(&train, &valid, 3).unwrap();

        // perfect validation error cannot improve, so training stops early
        assert!(report.rounds < 200);
        assert_eq!(report.rounds, report.best_iteration + 3);
    }

    #[test]
    fn test_stumps_still_separate_one_feature() {
        let train = separable(10);
        let valid = separable(3);
        let mut booster = GradientBoostedTrees::new(params().with_max_depth(1));
        booster.fit(&train, &valid, 5).unwrap();

        assert_eq!(booster.params().tree.max_depth, 1);
        assert_eq!(booster.predict(&valid.features).unwrap(), valid.labels);
    }

    #[test]
    fn test_single_class_predicts_it() {
        let train = dataset(&[(Some(1.0), None, 4), (Some(2.0), Some(1.0), 4)]);
        let valid = dataset(&[(Some(3.0), Some(1.0), 4)]);
        let mut booster = GradientBoostedTrees::new(params());
        let report = booster.fit(&train, &valid, 5).unwrap();

        assert_eq!(report.rounds, 0);
        assert_eq!(booster.predict(&valid.features).unwrap(), vec![4]);
    }

    #[test]
    fn test_predict_before_fit() {
        let booster = GradientBoostedTrees::default();
        let err = booster.predict(&separable(1).features).unwrap_err();
        assert!(matches!(err, ImputeError::NotFitted));
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), 1);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let total: f64 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }
}

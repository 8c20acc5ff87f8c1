//! Filling the missing struck-object categories of a model frame.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::Serialize;
use stats19_common::{code_column, code_series};
use stats19_model::ImputationOptions;
use stats19_transform::ModelFrame;
use tracing::{info, info_span, warn};

use crate::booster::{BoosterParams, GradientBoostedTrees};
use crate::classifier::{Classifier, FitReport};
use crate::dataset::{Dataset, FeatureMatrix};
use crate::error::{ImputeError, Result};
use crate::split::stratified_split;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationReport {
    pub label: String,
    pub labelled_rows: usize,
    pub missing_rows: usize,
    pub imputed_rows: usize,
    /// Count of each code written into previously missing rows.
    pub predicted: BTreeMap<i64, usize>,
    /// Absent when nothing needed imputing.
    pub fit: Option<FitReport>,
}

impl ImputationReport {
    pub fn skipped(&self) -> bool {
        self.fit.is_none()
    }
}

/// Imputes the frame's declared label column with a classifier trained on
/// the rows that have one.
///
/// Labelled rows are split (stratified by label, seeded) into training and
/// validation sets; the classifier stops early on the validation error and
/// then predicts every missing row. Labelled rows are never changed.
pub struct ImputationStep<C> {
    classifier: C,
    options: ImputationOptions,
}

impl ImputationStep<GradientBoostedTrees> {
    pub fn gradient_boosted(options: ImputationOptions) -> Self {
        let classifier = GradientBoostedTrees::new(BoosterParams::from(&options));
        Self::new(classifier, options)
    }
}

impl<C: Classifier> ImputationStep<C> {
    pub fn new(classifier: C, options: ImputationOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn run(&mut self, model: &mut ModelFrame) -> Result<ImputationReport> {
        let label = model.schema.imputed_label.clone();
        let span = info_span!("impute", label = %label);
        let _guard = span.enter();
        let start = Instant::now();

        if model.data.column(&label).is_err() {
            return Err(ImputeError::MissingLabel { column: label });
        }
        let mut labels = code_column(&model.data, &label)?;
        let missing: Vec<usize> = (0..labels.len()).filter(|&row| labels[row].is_none()).collect();
        let labelled: Vec<usize> = (0..labels.len()).filter(|&row| labels[row].is_some()).collect();

        let mut report = ImputationReport {
            label: label.clone(),
            labelled_rows: labelled.len(),
            missing_rows: missing.len(),
            imputed_rows: 0,
            predicted: BTreeMap::new(),
            fit: None,
        };
        if missing.is_empty() {
            info!(rows = labels.len(), "no missing labels, imputation skipped");
            return Ok(report);
        }
        if labelled.is_empty() {
            return Err(ImputeError::NoLabelledRows {
                missing: missing.len(),
            });
        }

        let features = FeatureMatrix::from_model_frame(model, &label)?;
        let known: Vec<i64> = labelled.iter().filter_map(|&row| labels[row]).collect();
        let labelled_set = Dataset::new(features.select_rows(&labelled), known)?;

        let split = stratified_split(
            &labelled_set.labels,
            self.options.validation_fraction,
            self.options.seed,
        )?;
        let train = labelled_set.select_rows(&split.train);
        let validation = labelled_set.select_rows(&split.validation);
        let fit = self.classifier.fit(
            &train,
            &validation,
            self.options.early_stopping_rounds,
        )?;

        let predictions = self.classifier.predict(&features.select_rows(&missing))?;
        if predictions.len() != missing.len() {
            return Err(ImputeError::RowMismatch {
                expected: missing.len(),
                got: predictions.len(),
            });
        }
        for (&row, &code) in missing.iter().zip(&predictions) {
            labels[row] = Some(code);
            *report.predicted.entry(code).or_insert(0) += 1;
        }

        let levels: BTreeSet<i64> = labels.iter().flatten().copied().collect();
        model.data.with_column(code_series(&label, labels))?;
        model.levels.insert(label.clone(), levels.into_iter().collect());

        if fit.validation_error > 0.5 {
            warn!(
                validation_error = fit.validation_error,
                "imputation classifier is wrong on most validation rows"
            );
        }
        report.imputed_rows = predictions.len();
        info!(
            labelled = report.labelled_rows,
            imputed = report.imputed_rows,
            classes = fit.classes.len(),
            best_iteration = fit.best_iteration,
            validation_error = fit.validation_error,
            duration_ms = start.elapsed().as_millis(),
            "imputed missing labels"
        );
        report.fit = Some(fit);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use stats19_model::FeatureSchema;

    /// Predicts the most frequent training label everywhere.
    #[derive(Default)]
    struct Majority {
        label: Option<i64>,
        train_rows: usize,
    }

    impl Classifier for Majority {
        fn fit(
            &mut self,
            train: &Dataset,
            validation: &Dataset,
            _early_stopping_rounds: usize,
        ) -> Result<FitReport> {
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for label in &train.labels {
                *counts.entry(*label).or_insert(0) += 1;
            }
            self.label = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(label, _)| *label);
            self.train_rows = train.len();
            Ok(FitReport {
                classes: counts.keys().copied().collect(),
                train_rows: train.len(),
                validation_rows: validation.len(),
                rounds: 1,
                best_iteration: 1,
                validation_error: 0.0,
            })
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<i64>> {
            let label = self.label.ok_or(ImputeError::NotFitted)?;
            Ok(vec![label; features.row_count()])
        }
    }

    fn model(labels: Vec<Option<i64>>) -> ModelFrame {
        let n = labels.len();
        let data = DataFrame::new(vec![
            Series::new("vehicle_type".into(), vec![9i64; n]).into_column(),
            Series::new("casualty_modal_type".into(), labels).into_column(),
            Series::new("age_of_driver".into(), vec![Some(30.0f64); n]).into_column(),
            Series::new("casualty_worst".into(), vec![0i64; n]).into_column(),
        ])
        .unwrap();
        ModelFrame {
            data,
            schema: FeatureSchema {
                categorical: vec!["vehicle_type".to_string(), "casualty_modal_type".to_string()],
                numerical: vec!["age_of_driver".to_string()],
                target: "casualty_worst".to_string(),
                imputed_label: "casualty_modal_type".to_string(),
            },
            levels: BTreeMap::new(),
        }
    }

    #[test]
    fn test_fills_only_missing_rows() {
        let mut frame = model(vec![Some(9), Some(9), Some(9), None, Some(1), Some(1), None]);
        let mut step = ImputationStep::new(Majority::default(), ImputationOptions::default());
        let report = step.run(&mut frame).unwrap();

        let labels = code_column(&frame.data, "casualty_modal_type").unwrap();
        assert_eq!(
            labels,
            vec![Some(9), Some(9), Some(9), Some(9), Some(1), Some(1), Some(9)]
        );
        assert_eq!(report.imputed_rows, 2);
        assert_eq!(report.predicted, BTreeMap::from([(9, 2)]));
        assert_eq!(frame.missing_count("casualty_modal_type"), 0);
        assert_eq!(frame.levels_of("casualty_modal_type"), &[1, 9]);
        // one of each class held out for validation
        assert_eq!(step.classifier().train_rows, 3);
    }

    #[test]
    fn test_nothing_missing_is_skipped() {
        let mut frame = model(vec![Some(1), Some(1)]);
        let mut step = ImputationStep::new(Majority::default(), ImputationOptions::default());
        let report = step.run(&mut frame).unwrap();
        assert!(report.skipped());
        assert_eq!(report.imputed_rows, 0);
    }

    #[test]
    fn test_no_labelled_rows() {
        let mut frame = model(vec![None, None]);
        let mut step = ImputationStep::new(Majority::default(), ImputationOptions::default());
        let err = step.run(&mut frame).unwrap_err();
        assert!(matches!(err, ImputeError::NoLabelledRows { missing: 2 }));
    }

    #[test]
    fn test_singleton_class_stops_imputation() {
        let mut frame = model(vec![Some(1), Some(1), Some(18), None]);
        let before = frame.data.clone();
        let mut step = ImputationStep::new(Majority::default(), ImputationOptions::default());
        let err = step.run(&mut frame).unwrap_err();

        assert!(matches!(
            err,
            ImputeError::Stratification { class: 18, count: 1 }
        ));
        assert!(frame.data.equals_missing(&before));
    }
}

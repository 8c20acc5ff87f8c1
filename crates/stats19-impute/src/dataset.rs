//! Feature matrices for the imputation classifier.
//!
//! Every column of the model frame except the label becomes a feature.
//! Categorical columns keep their codes as unordered levels; numerical
//! columns and the target are treated as ordered values. Nulls stay `None`
//! and are routed by the trees rather than filled.

use std::collections::BTreeMap;

use stats19_common::f64_column;
use stats19_model::ColumnRole;
use stats19_transform::ModelFrame;

use crate::error::{ImputeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

/// Column-major matrix of optional feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub kinds: Vec<FeatureKind>,
    columns: Vec<Vec<Option<f64>>>,
    rows: usize,
}

impl FeatureMatrix {
    pub fn new(
        names: Vec<String>,
        kinds: Vec<FeatureKind>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if let Some(column) = columns.iter().find(|column| column.len() != rows) {
            return Err(ImputeError::RowMismatch {
                expected: rows,
                got: column.len(),
            });
        }
        Ok(Self {
            names,
            kinds,
            columns,
            rows,
        })
    }

    /// Features for predicting `label` from the other columns of `model`.
    pub fn from_model_frame(model: &ModelFrame, label: &str) -> Result<Self> {
        let mut names = Vec::new();
        let mut kinds = Vec::new();
        let mut columns = Vec::new();
        for (name, role) in model.schema.columns() {
            if name == label {
                continue;
            }
            let kind = match role {
                ColumnRole::Categorical => FeatureKind::Categorical,
                ColumnRole::Numerical | ColumnRole::Target => FeatureKind::Numeric,
            };
            names.push(name.to_string());
            kinds.push(kind);
            columns.push(f64_column(&model.data, name)?);
        }
        Self::new(names, kinds, columns)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, feature: usize) -> &[Option<f64>] {
        &self.columns[feature]
    }

    pub fn value(&self, row: usize, feature: usize) -> Option<f64> {
        self.columns[feature][row]
    }

    /// The given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            kinds: self.kinds.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| rows.iter().map(|&row| column[row]).collect())
                .collect(),
            rows: rows.len(),
        }
    }
}

/// Features paired with known label codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: FeatureMatrix,
    pub labels: Vec<i64>,
}

impl Dataset {
    pub fn new(features: FeatureMatrix, labels: Vec<i64>) -> Result<Self> {
        if features.row_count() != labels.len() && features.feature_count() > 0 {
            return Err(ImputeError::RowMismatch {
                expected: features.row_count(),
                got: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            features: self.features.select_rows(rows),
            labels: rows.iter().map(|&row| self.labels[row]).collect(),
        }
    }
}

/// Bin index reserved for missing values.
pub const MISSING_BIN: u16 = 0;

/// Maps raw values of one feature onto a small set of bins.
///
/// Numeric features use upper bounds taken from the training quantiles.
/// Categorical features give each frequent level its own bin and lump the
/// rest (and levels unseen in training) into a shared overflow bin.
#[derive(Debug, Clone, PartialEq)]
pub enum BinMapper {
    Numeric { bounds: Vec<f64> },
    Categorical { bins: BTreeMap<i64, u16>, overflow: u16 },
}

impl BinMapper {
    pub fn fit(kind: FeatureKind, values: &[Option<f64>], max_bins: usize) -> Self {
        // one bin goes to missing values
        let value_bins = max_bins.saturating_sub(1).max(1);
        match kind {
            FeatureKind::Numeric => Self::fit_numeric(values, value_bins),
            FeatureKind::Categorical => Self::fit_categorical(values, value_bins),
        }
    }

    fn fit_numeric(values: &[Option<f64>], value_bins: usize) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        present.sort_by(f64::total_cmp);
        present.dedup();
        if present.len() <= value_bins {
            return Self::Numeric { bounds: present };
        }

        let mut bounds: Vec<f64> = (1..=value_bins)
            .map(|bin| {
                let idx = (bin * present.len()).div_ceil(value_bins) - 1;
                present[idx.min(present.len() - 1)]
            })
            .collect();
        bounds.dedup();
        Self::Numeric { bounds }
    }

    fn fit_categorical(values: &[Option<f64>], value_bins: usize) -> Self {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(*value as i64).or_insert(0) += 1;
        }
        let dedicated = if counts.len() <= value_bins {
            counts.len()
        } else {
            value_bins - 1
        };

        let mut by_frequency: Vec<(i64, usize)> = counts.into_iter().collect();
        // most frequent first, smaller code on ties
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let bins = by_frequency
            .into_iter()
            .take(dedicated)
            .enumerate()
            .map(|(idx, (code, _))| (code, idx as u16 + 1))
            .collect();
        Self::Categorical {
            bins,
            overflow: dedicated as u16 + 1,
        }
    }

    /// Total bins including the missing bin.
    pub fn bin_count(&self) -> usize {
        match self {
            Self::Numeric { bounds } => bounds.len() + 2,
            Self::Categorical { overflow, .. } => usize::from(*overflow) + 1,
        }
    }

    pub fn bin(&self, value: Option<f64>) -> u16 {
        let Some(value) = value else {
            return MISSING_BIN;
        };
        match self {
            Self::Numeric { bounds } => {
                let idx = bounds.partition_point(|bound| *bound < value);
                idx as u16 + 1
            }
            Self::Categorical { bins, overflow } => {
                bins.get(&(value as i64)).copied().unwrap_or(*overflow)
            }
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical { .. })
    }
}

/// A feature matrix translated to bin indices, column-major.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    pub columns: Vec<Vec<u16>>,
    pub rows: usize,
}

impl BinnedMatrix {
    pub fn from_features(features: &FeatureMatrix, mappers: &[BinMapper]) -> Self {
        let columns = mappers
            .iter()
            .enumerate()
            .map(|(feature, mapper)| {
                features
                    .column(feature)
                    .iter()
                    .map(|value| mapper.bin(*value))
                    .collect()
            })
            .collect();
        Self {
            columns,
            rows: features.row_count(),
        }
    }

    pub fn bin(&self, row: usize, feature: usize) -> u16 {
        self.columns[feature][row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_bins_keep_order_and_missing() {
        let values = vec![Some(3.0), Some(1.0), None, Some(2.0), Some(2.0)];
        let mapper = BinMapper::fit(FeatureKind::Numeric, &values, 32);

        assert_eq!(mapper.bin(None), MISSING_BIN);
        assert_eq!(mapper.bin(Some(1.0)), 1);
        assert_eq!(mapper.bin(Some(2.0)), 2);
        assert_eq!(mapper.bin(Some(3.0)), 3);
        // beyond the training range
        assert_eq!(mapper.bin(Some(10.0)), 4);
        assert_eq!(mapper.bin_count(), 5);
        assert!(!mapper.is_categorical());
    }

    #[test]
    fn test_numeric_bins_are_capped() {
        let values: Vec<Option<f64>> = (0..1000).map(|v| Some(f64::from(v))).collect();
        let mapper = BinMapper::fit(FeatureKind::Numeric, &values, 16);
        assert!(mapper.bin_count() <= 17);
        assert!(mapper.bin(Some(0.0)) < mapper.bin(Some(999.0)));
    }

    #[test]
    fn test_categorical_overflow_bin() {
        let values = vec![Some(9.0), Some(9.0), Some(1.0), Some(2.0), Some(3.0), Some(3.0)];
        let mapper = BinMapper::fit(FeatureKind::Categorical, &values, 4);

        // three value bins: 3 and 9 dedicated, everything else overflows
        assert_eq!(mapper.bin(Some(3.0)), 1);
        assert_eq!(mapper.bin(Some(9.0)), 2);
        assert_eq!(mapper.bin(Some(1.0)), 3);
        assert_eq!(mapper.bin(Some(42.0)), 3);
        assert_eq!(mapper.bin(None), MISSING_BIN);
        assert!(mapper.is_categorical());
    }

    #[test]
    fn test_select_rows() {
        let features = FeatureMatrix::new(
            vec!["a".to_string()],
            vec![FeatureKind::Numeric],
            vec![vec![Some(1.0), None, Some(3.0)]],
        )
        .unwrap();
        let dataset = Dataset::new(features, vec![10, 20, 30]).unwrap();
        let subset = dataset.select_rows(&[2, 0]);

        assert_eq!(subset.labels, vec![30, 10]);
        assert_eq!(subset.features.column(0), &[Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = FeatureMatrix::new(
            vec!["a".to_string(), "b".to_string()],
            vec![FeatureKind::Numeric, FeatureKind::Numeric],
            vec![vec![Some(1.0)], vec![]],
        )
        .unwrap_err();
        assert!(matches!(err, ImputeError::RowMismatch { .. }));
    }
}

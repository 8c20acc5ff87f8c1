//! Seeded stratified train/validation split.

use std::collections::BTreeMap;

use rand::prelude::*;

use crate::error::{ImputeError, Result};

/// Row indices of each side of a split, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Split {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Splits `labels` so every class keeps roughly `validation_fraction` of its
/// rows in validation and at least one row on each side.
///
/// Fails on the smallest code whose class has fewer than two rows. The same
/// labels, fraction and seed always give the same split.
pub fn stratified_split(labels: &[i64], validation_fraction: f64, seed: u64) -> Result<Split> {
    if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
        return Err(ImputeError::InvalidOptions {
            message: format!("validation_fraction must be in (0, 1), got {validation_fraction}"),
        });
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        by_class.entry(*label).or_default().push(row);
    }
    if let Some((class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(ImputeError::Stratification {
            class: *class,
            count: rows.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = Split::default();
    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let held_out = ((rows.len() as f64) * validation_fraction).round() as usize;
        let held_out = held_out.clamp(1, rows.len() - 1);
        split.validation.extend_from_slice(&rows[..held_out]);
        split.train.extend_from_slice(&rows[held_out..]);
    }
    split.train.sort_unstable();
    split.validation.sort_unstable();
    Ok(split)
}

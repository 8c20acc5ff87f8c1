//! Accident reference normalization.
//!
//! A reference that passed through a numeric type loses its leading zeros
//! (`"000000123"` becomes `123`). Left-padding restores the canonical form so
//! all three tables join on the same text.

use polars::prelude::*;
use stats19_common::text_column;
use stats19_model::ACCIDENT_REFERENCE_WIDTH;

use crate::error::Result;

/// Left-pads `raw` with zeros to the canonical reference width.
///
/// Idempotent; references already at or beyond the width pass through.
pub fn normalize_accident_reference(raw: &str) -> String {
    let trimmed = raw.trim();
    format!("{trimmed:0>width$}", width = ACCIDENT_REFERENCE_WIDTH)
}

/// Rewrites column `name` of `df` as normalized reference text.
///
/// Numeric cells are rendered without a decimal part first, so a float `123.0`
/// becomes `"000000123"`. Blank cells stay blank.
pub fn normalize_key_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let values: Vec<String> = text_column(df, name)?
        .into_iter()
        .map(|value| {
            if value.is_empty() {
                value
            } else {
                normalize_accident_reference(&value)
            }
        })
        .collect();
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

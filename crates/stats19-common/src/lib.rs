//! Shared utilities for the stats19 crates.
//!
//! Cell conversions tolerate the shapes the published extracts come in:
//! codes may arrive as text (`"3"`), as integers, or as floats written by a
//! spreadsheet round trip (`"3.0"`).

pub mod polars;

pub use polars::{
    any_to_code, any_to_f64, any_to_string, code_column, code_series, f64_column, f64_series,
    format_numeric, parse_code, parse_f64, text_column,
};

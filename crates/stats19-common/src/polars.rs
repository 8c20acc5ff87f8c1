//! Polars cell and column helpers.

use polars::prelude::*;

/// Renders a cell as text; `Null` becomes an empty string and integral
/// floats lose their decimal part.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.trim().to_string(),
        AnyValue::StringOwned(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Formats a float without trailing zeros (`3.0` → `"3"`, `1.50` → `"1.5"`).
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Reads a cell as a float; blank or unparseable text is `None`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Reads a cell as an integer code.
///
/// Floats are accepted only when integral, so `"12.0"` is 12 but `"12.5"`
/// is rejected rather than truncated.
pub fn any_to_code(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => integral(f64::from(v)),
        AnyValue::Float64(v) => integral(v),
        AnyValue::String(s) => parse_code(s),
        AnyValue::StringOwned(s) => parse_code(&s),
        _ => None,
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_code(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_f64(trimmed).and_then(integral))
}

fn integral(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Some(v as i64)
    } else {
        None
    }
}

/// Trimmed text of every cell of `name`.
pub fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub fn code_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_code(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub fn f64_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Nullable `Int64` column.
pub fn code_series(name: &str, values: Vec<Option<i64>>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Nullable `Float64` column.
pub fn f64_series(name: &str, values: Vec<Option<f64>>) -> Column {
    Series::new(name.into(), values).into_column()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(123)), "123");
        assert_eq!(any_to_string(AnyValue::Float64(123.0)), "123");
        assert_eq!(any_to_string(AnyValue::String(" 01AB ")), "01AB");
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.50), "1.5");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(-0.0), "0");
        assert_eq!(format_numeric(100.0), "100");
    }

    #[test]
    fn test_any_to_code() {
        assert_eq!(any_to_code(AnyValue::Null), None);
        assert_eq!(any_to_code(AnyValue::String("12")), Some(12));
        assert_eq!(any_to_code(AnyValue::String("12.0")), Some(12));
        assert_eq!(any_to_code(AnyValue::String("12.5")), None);
        assert_eq!(any_to_code(AnyValue::String("-1")), Some(-1));
        assert_eq!(any_to_code(AnyValue::String("")), None);
        assert_eq!(any_to_code(AnyValue::Float64(3.0)), Some(3));
        assert_eq!(any_to_code(AnyValue::String("E01000001")), None);
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::String("-0.125")), Some(-0.125));
        assert_eq!(any_to_f64(AnyValue::String("NaN")), None);
        assert_eq!(any_to_f64(AnyValue::Int32(4)), Some(4.0));
    }

    #[test]
    fn test_column_readers() {
        let df = DataFrame::new(vec![
            Series::new("code".into(), vec!["1", "", "3.0"]).into_column(),
            Series::new("real".into(), vec![Some(1.5), None, Some(2.0)]).into_column(),
        ])
        .unwrap();
        assert_eq!(
            code_column(&df, "code").unwrap(),
            vec![Some(1), None, Some(3)]
        );
        assert_eq!(
            f64_column(&df, "real").unwrap(),
            vec![Some(1.5), None, Some(2.0)]
        );
        assert_eq!(text_column(&df, "code").unwrap(), vec!["1", "", "3.0"]);
        assert!(code_column(&df, "absent").is_err());
    }

    #[test]
    fn test_series_builders() {
        let column = code_series("vehicle_type", vec![Some(9), None]);
        assert_eq!(column.dtype(), &DataType::Int64);
        assert_eq!(column.null_count(), 1);
        let column = f64_series("latitude", vec![Some(51.5)]);
        assert_eq!(column.dtype(), &DataType::Float64);
    }
}

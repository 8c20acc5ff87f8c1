//! Calendar features from the accident date and time, and the final sort.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use stats19_model::{CalendarFeatures, FeatureRow, JoinedRow};
use tracing::warn;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureReport {
    pub rows: usize,
    /// Rows whose date or time could not be parsed; their calendar features
    /// are missing.
    pub unparseable_timestamps: usize,
    /// Earliest timestamp of the batch, the zero of `elapsed_time`.
    pub origin: Option<NaiveDateTime>,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Combines `DD/MM/YYYY` (or ISO) date text and `HH:MM` time text.
///
/// Both parts are required; either one missing or malformed gives `None`.
pub fn parse_timestamp(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = parse_date(date?)?;
    let time = parse_time(time?)?;
    Some(date.and_time(time))
}

/// Calendar decomposition of one timestamp, without `elapsed_time`.
pub fn calendar_features(timestamp: Option<NaiveDateTime>) -> CalendarFeatures {
    let Some(ts) = timestamp else {
        return CalendarFeatures::default();
    };
    CalendarFeatures {
        timestamp: Some(ts.and_utc().timestamp()),
        month: Some(i64::from(ts.month())),
        day: Some(i64::from(ts.day())),
        dayw: Some(i64::from(ts.weekday().num_days_from_monday())),
        hour: Some(i64::from(ts.hour())),
        elapsed_time: None,
    }
}

/// Adds calendar features to every row and sorts the batch by
/// (accident year, accident reference, vehicle reference).
///
/// `elapsed_time` counts seconds from the earliest timestamp of the whole
/// batch, so it must run on the concatenation of all years.
pub fn engineer_features(rows: Vec<JoinedRow>) -> (Vec<FeatureRow>, FeatureReport) {
    let mut report = FeatureReport {
        rows: rows.len(),
        ..FeatureReport::default()
    };

    let timestamps: Vec<Option<NaiveDateTime>> = rows
        .iter()
        .map(|row| {
            parse_timestamp(
                row.accident.date.as_deref(),
                row.accident.time.as_deref(),
            )
        })
        .collect();
    report.unparseable_timestamps = timestamps.iter().filter(|ts| ts.is_none()).count();
    report.origin = timestamps.iter().flatten().min().copied();

    let mut features: Vec<FeatureRow> = rows
        .into_iter()
        .zip(timestamps)
        .map(|(joined, ts)| {
            let mut calendar = calendar_features(ts);
            calendar.elapsed_time = match (ts, report.origin) {
                (Some(ts), Some(origin)) => Some((ts - origin).num_seconds() as f64),
                _ => None,
            };
            FeatureRow { joined, calendar }
        })
        .collect();

    features.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    if report.unparseable_timestamps > 0 {
        warn!(
            unparseable_timestamps = report.unparseable_timestamps,
            rows = report.rows,
            "rows without a parseable accident timestamp"
        );
    }
    (features, report)
}

//! Person-level casualties reduced to one summary per vehicle.
//!
//! Groups are seeded from the vehicle key set, so every vehicle gets exactly
//! one summary. A vehicle with no casualties is aggregated over a single
//! placeholder row whose class is [`NO_CASUALTY_CLASS`] and whose severity is
//! [`NON_INJURY_SEVERITY`].

use std::collections::BTreeMap;

use serde::Serialize;
use stats19_model::{
    AggregationOptions, CasualtyRecord, CasualtySummary, NO_CASUALTY_CLASS, NON_INJURY_SEVERITY,
    PASSENGER_CLASS, VehicleKey, VehicleRecord,
};

use crate::recode::{consolidate_vehicle_type, male_indicator, worst_severity_label};

/// Counts from one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Person rows attached to a vehicle.
    pub casualty_rows: usize,
    /// Person rows whose vehicle key is not in the vehicle table.
    pub orphan_casualties: usize,
    pub vehicles: usize,
    pub vehicles_without_casualties: usize,
    /// Vehicles with no eligible casualty type, left for imputation.
    pub missing_modal_type: usize,
}

/// A casualty row normalized for aggregation.
#[derive(Debug, Clone, Copy)]
struct PersonRow {
    class: Option<i64>,
    severity: Option<i64>,
    casualty_type: Option<i64>,
    age: Option<f64>,
    male: Option<f64>,
}

impl PersonRow {
    fn from_record(record: &CasualtyRecord) -> Self {
        Self {
            class: record.casualty_class,
            severity: record.casualty_severity,
            casualty_type: consolidate_vehicle_type(record.casualty_type),
            age: record
                .age_of_casualty
                .filter(|age| *age >= 0)
                .map(|age| age as f64),
            male: male_indicator(record.sex_of_casualty),
        }
    }

    fn placeholder() -> Self {
        Self {
            class: Some(NO_CASUALTY_CLASS),
            severity: Some(NON_INJURY_SEVERITY),
            casualty_type: None,
            age: None,
            male: None,
        }
    }
}

/// Running mean over valid values.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Most frequent code; ties go to the smallest code.
pub fn modal_code(codes: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for code in codes {
        *counts.entry(code).or_default() += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    // Ascending key order with a strict comparison keeps the smallest code on ties.
    for (code, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((code, count));
        }
    }
    best.map(|(code, _)| code)
}

/// Summarizes the rows of one vehicle. `placeholder` marks a vehicle with no
/// casualties, whose single row is the sentinel row.
fn summarize(
    rows: &[PersonRow],
    placeholder: bool,
    options: &AggregationOptions,
) -> (CasualtySummary, Mean, Mean) {
    let mut class_counts = [0u32; 4];
    let mut severity_counts = [0u32; 4];
    let mut worst_severity = NON_INJURY_SEVERITY;
    let mut age = Mean::default();
    let mut male = Mean::default();

    for row in rows {
        if let Some(slot) = row
            .class
            .and_then(|class| usize::try_from(class).ok())
            .and_then(|idx| class_counts.get_mut(idx))
        {
            *slot += 1;
        }
        if let Some(severity) = row.severity {
            if let Some(slot) = usize::try_from(severity - 1)
                .ok()
                .and_then(|idx| severity_counts.get_mut(idx))
            {
                *slot += 1;
            }
            worst_severity = worst_severity.min(severity);
        }
        age.push(row.age);
        male.push(row.male);
    }

    let casualty_modal_type = modal_code(rows.iter().filter_map(|row| {
        if options.exclude_passengers_from_modal_type && row.class == Some(PASSENGER_CLASS) {
            None
        } else {
            row.casualty_type
        }
    }));

    let summary = CasualtySummary {
        worst_severity,
        casualty_worst: worst_severity_label(worst_severity).unwrap_or(0),
        casualty_modal_type,
        class_counts,
        severity_counts,
        casualty_total: if placeholder {
            0
        } else {
            u32::try_from(rows.len()).unwrap_or(u32::MAX)
        },
        casualty_mean_age: None,
        casualty_share_male: None,
    };
    (summary, age, male)
}

/// Aggregates `casualties` onto the vehicle key set of `vehicles`.
///
/// Casualties whose key matches no vehicle are counted and ignored. With
/// auxiliary aggregates enabled, a vehicle with no valid age (or sex) takes
/// the partition-wide mean over all attached person rows.
pub fn aggregate_casualties(
    vehicles: &[VehicleRecord],
    casualties: &[CasualtyRecord],
    options: &AggregationOptions,
) -> (BTreeMap<VehicleKey, CasualtySummary>, AggregateReport) {
    let mut groups: BTreeMap<VehicleKey, Vec<PersonRow>> = vehicles
        .iter()
        .map(|vehicle| (vehicle.key(), Vec::new()))
        .collect();
    let mut report = AggregateReport {
        vehicles: groups.len(),
        ..AggregateReport::default()
    };

    for casualty in casualties {
        match groups.get_mut(&casualty.key()) {
            Some(rows) => {
                rows.push(PersonRow::from_record(casualty));
                report.casualty_rows += 1;
            }
            None => report.orphan_casualties += 1,
        }
    }

    let mut partition_age = Mean::default();
    let mut partition_male = Mean::default();
    let mut summaries = BTreeMap::new();
    let mut pending_aux = Vec::new();

    for (key, mut rows) in groups {
        let placeholder = rows.is_empty();
        if placeholder {
            rows.push(PersonRow::placeholder());
            report.vehicles_without_casualties += 1;
        }
        let (summary, age, male) = summarize(&rows, placeholder, options);
        if summary.casualty_modal_type.is_none() {
            report.missing_modal_type += 1;
        }
        partition_age.sum += age.sum;
        partition_age.count += age.count;
        partition_male.sum += male.sum;
        partition_male.count += male.count;
        pending_aux.push((key.clone(), age.value(), male.value()));
        summaries.insert(key, summary);
    }

    if options.include_auxiliary_aggregates {
        for (key, age, male) in pending_aux {
            if let Some(summary) = summaries.get_mut(&key) {
                summary.casualty_mean_age = age.or_else(|| partition_age.value());
                summary.casualty_share_male = male.or_else(|| partition_male.value());
            }
        }
    }

    (summaries, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(reference: &str, vehicle_reference: i64) -> VehicleRecord {
        VehicleRecord {
            accident_reference: reference.to_string(),
            vehicle_reference,
            ..VehicleRecord::default()
        }
    }

    fn casualty(
        reference: &str,
        vehicle_reference: i64,
        class: i64,
        severity: i64,
        casualty_type: i64,
    ) -> CasualtyRecord {
        CasualtyRecord {
            accident_reference: reference.to_string(),
            vehicle_reference,
            casualty_class: Some(class),
            casualty_severity: Some(severity),
            casualty_type: Some(casualty_type),
            ..CasualtyRecord::default()
        }
    }

    #[test]
    fn test_vehicle_without_casualties_gets_sentinels() {
        let vehicles = vec![vehicle("000000001", 1)];
        let (summaries, report) =
            aggregate_casualties(&vehicles, &[], &AggregationOptions::default());

        let summary = &summaries[&VehicleKey::new("000000001", 1)];
        assert_eq!(summary.worst_severity, NON_INJURY_SEVERITY);
        assert_eq!(summary.casualty_worst, 0);
        assert_eq!(summary.class_counts, [1, 0, 0, 0]);
        assert_eq!(summary.severity_counts, [0, 0, 0, 1]);
        assert_eq!(summary.casualty_total, 0);
        assert_eq!(summary.casualty_modal_type, None);
        assert_eq!(report.vehicles_without_casualties, 1);
        assert_eq!(report.missing_modal_type, 1);
    }

    #[test]
    fn test_fatal_and_slight_casualties() {
        let vehicles = vec![vehicle("000000001", 1)];
        let casualties = vec![
            casualty("000000001", 1, 1, 1, 9),
            casualty("000000001", 1, 3, 3, 0),
        ];
        let (summaries, report) =
            aggregate_casualties(&vehicles, &casualties, &AggregationOptions::default());

        let summary = &summaries[&VehicleKey::new("000000001", 1)];
        assert_eq!(summary.worst_severity, 1);
        assert_eq!(summary.casualty_worst, 1);
        assert_eq!(summary.casualty_total, 2);
        assert_eq!(summary.class_counts, [0, 1, 0, 1]);
        assert_eq!(summary.severity_counts, [1, 0, 1, 0]);
        assert_eq!(report.casualty_rows, 2);
    }

    #[test]
    fn test_unknown_class_and_severity_still_count_as_casualties() {
        let vehicles = vec![vehicle("000000001", 1)];
        let mut unknown_class = casualty("000000001", 1, 1, 2, 9);
        unknown_class.casualty_class = None;
        let mut unknown_severity = casualty("000000001", 1, 1, 3, 9);
        unknown_severity.casualty_severity = None;
        let (summaries, report) = aggregate_casualties(
            &vehicles,
            &[unknown_class, unknown_severity],
            &AggregationOptions::default(),
        );

        let summary = &summaries[&VehicleKey::new("000000001", 1)];
        assert_eq!(summary.casualty_total, 2);
        assert_eq!(summary.class_counts, [0, 1, 0, 0]);
        assert_eq!(summary.severity_counts, [0, 1, 0, 0]);
        assert_eq!(summary.worst_severity, 2);
        assert_eq!(summary.casualty_worst, 1);
        assert_eq!(summary.casualty_modal_type, Some(9));
        assert_eq!(report.casualty_rows, 2);
        assert_eq!(report.vehicles_without_casualties, 0);
    }

    #[test]
    fn test_modal_type_tie_picks_smallest_code() {
        assert_eq!(modal_code([9, 0, 9, 0]), Some(0));
        assert_eq!(modal_code([11, 9, 11]), Some(11));
        assert_eq!(modal_code([]), None);
    }

    #[test]
    fn test_modal_type_is_consolidated_and_excludes_passengers() {
        let vehicles = vec![vehicle("000000001", 1)];
        let casualties = vec![
            casualty("000000001", 1, 1, 3, 4),
            casualty("000000001", 1, 2, 3, 9),
            casualty("000000001", 1, 2, 3, 9),
        ];
        let (summaries, _) =
            aggregate_casualties(&vehicles, &casualties, &AggregationOptions::default());
        assert_eq!(
            summaries[&VehicleKey::new("000000001", 1)].casualty_modal_type,
            Some(2)
        );

        let options = AggregationOptions {
            exclude_passengers_from_modal_type: false,
            ..AggregationOptions::default()
        };
        let (summaries, _) = aggregate_casualties(&vehicles, &casualties, &options);
        assert_eq!(
            summaries[&VehicleKey::new("000000001", 1)].casualty_modal_type,
            Some(9)
        );
    }

    #[test]
    fn test_only_passengers_leaves_modal_type_missing() {
        let vehicles = vec![vehicle("000000001", 1)];
        let casualties = vec![casualty("000000001", 1, 2, 2, 9)];
        let (summaries, report) =
            aggregate_casualties(&vehicles, &casualties, &AggregationOptions::default());
        let summary = &summaries[&VehicleKey::new("000000001", 1)];
        assert_eq!(summary.casualty_modal_type, None);
        assert_eq!(summary.casualty_worst, 1);
        assert_eq!(report.missing_modal_type, 1);
    }

    #[test]
    fn test_orphan_casualties_are_counted() {
        let vehicles = vec![vehicle("000000001", 1)];
        let casualties = vec![casualty("000000001", 2, 1, 3, 9)];
        let (summaries, report) =
            aggregate_casualties(&vehicles, &casualties, &AggregationOptions::default());
        assert_eq!(summaries.len(), 1);
        assert_eq!(report.orphan_casualties, 1);
        assert_eq!(report.casualty_rows, 0);
    }

    #[test]
    fn test_auxiliary_aggregates_fall_back_to_partition_mean() {
        let vehicles = vec![vehicle("000000001", 1), vehicle("000000002", 1)];
        let mut first = casualty("000000001", 1, 1, 3, 9);
        first.age_of_casualty = Some(30);
        first.sex_of_casualty = Some(1);
        let mut second = casualty("000000001", 1, 3, 3, 0);
        second.age_of_casualty = Some(50);
        second.sex_of_casualty = Some(2);
        let options = AggregationOptions {
            include_auxiliary_aggregates: true,
            ..AggregationOptions::default()
        };
        let (summaries, _) = aggregate_casualties(&vehicles, &[first, second], &options);

        let with = &summaries[&VehicleKey::new("000000001", 1)];
        assert_eq!(with.casualty_mean_age, Some(40.0));
        assert_eq!(with.casualty_share_male, Some(0.5));
        let without = &summaries[&VehicleKey::new("000000002", 1)];
        assert_eq!(without.casualty_mean_age, Some(40.0));
        assert_eq!(without.casualty_share_male, Some(0.5));
    }

    #[test]
    fn test_auxiliary_aggregates_off_by_default() {
        let vehicles = vec![vehicle("000000001", 1)];
        let mut row = casualty("000000001", 1, 1, 3, 9);
        row.age_of_casualty = Some(30);
        let (summaries, _) =
            aggregate_casualties(&vehicles, &[row], &AggregationOptions::default());
        assert_eq!(
            summaries[&VehicleKey::new("000000001", 1)].casualty_mean_age,
            None
        );
    }
}

//! Vehicle ⋈ casualty summary ⋈ accident, per year.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use stats19_model::{AccidentRecord, CasualtySummary, JoinedRow, VehicleKey, VehicleRecord};
use tracing::warn;

/// Join coverage of one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub year: i32,
    pub vehicles: usize,
    /// Vehicles that found their accident and survive the inner join.
    pub matched: usize,
    /// Vehicles whose accident reference has no accident record.
    pub dropped_vehicles: usize,
    /// Vehicles without a casualty summary (left join miss).
    pub unmatched_summaries: usize,
    /// Accident rows discarded because an earlier row had the same reference.
    pub duplicate_accidents: usize,
}

impl JoinReport {
    pub fn has_losses(&self) -> bool {
        self.dropped_vehicles > 0 || self.unmatched_summaries > 0
    }
}

/// Indexes accidents by reference, keeping the first row of a duplicated
/// reference.
fn index_accidents(accidents: Vec<AccidentRecord>) -> (BTreeMap<String, AccidentRecord>, usize) {
    let mut index = BTreeMap::new();
    let mut duplicates = 0;
    for accident in accidents {
        match index.entry(accident.accident_reference.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(accident);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }
    (index, duplicates)
}

/// Left-joins each vehicle to its summary, then inner-joins the accident.
///
/// Output preserves vehicle read order. Losses are counted in the report and
/// logged, never raised.
pub fn join_year(
    year: i32,
    vehicles: Vec<VehicleRecord>,
    summaries: &BTreeMap<VehicleKey, CasualtySummary>,
    accidents: Vec<AccidentRecord>,
) -> (Vec<JoinedRow>, JoinReport) {
    let (accidents, duplicate_accidents) = index_accidents(accidents);
    let mut report = JoinReport {
        year,
        vehicles: vehicles.len(),
        duplicate_accidents,
        ..JoinReport::default()
    };

    let mut rows = Vec::with_capacity(vehicles.len());
    for vehicle in vehicles {
        let casualty = summaries.get(&vehicle.key()).cloned();
        if casualty.is_none() {
            report.unmatched_summaries += 1;
        }
        let Some(accident) = accidents.get(&vehicle.accident_reference) else {
            report.dropped_vehicles += 1;
            continue;
        };
        rows.push(JoinedRow {
            year,
            vehicle,
            casualty,
            accident: accident.clone(),
        });
    }
    report.matched = rows.len();

    if report.dropped_vehicles > 0 {
        warn!(
            year,
            dropped_vehicles = report.dropped_vehicles,
            vehicles = report.vehicles,
            "vehicles without an accident record dropped by the join"
        );
    }
    if report.unmatched_summaries > 0 {
        warn!(
            year,
            unmatched_summaries = report.unmatched_summaries,
            "vehicles without a casualty summary"
        );
    }
    if report.duplicate_accidents > 0 {
        warn!(
            year,
            duplicate_accidents = report.duplicate_accidents,
            "duplicate accident references, keeping the first row"
        );
    }

    (rows, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats19_model::AggregationOptions;

    use crate::aggregate::aggregate_casualties;

    fn vehicle(reference: &str, vehicle_reference: i64) -> VehicleRecord {
        VehicleRecord {
            accident_reference: reference.to_string(),
            vehicle_reference,
            ..VehicleRecord::default()
        }
    }

    fn accident(reference: &str, speed_limit: i64) -> AccidentRecord {
        AccidentRecord {
            accident_reference: reference.to_string(),
            speed_limit: Some(speed_limit),
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn test_inner_join_drops_vehicles_without_accident() {
        let vehicles = vec![
            vehicle("000000001", 1),
            vehicle("000000002", 1),
            vehicle("000000001", 2),
        ];
        let (summaries, _) =
            aggregate_casualties(&vehicles, &[], &AggregationOptions::default());
        let (rows, report) = join_year(2020, vehicles, &summaries, vec![accident("000000001", 30)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(report.vehicles, 3);
        assert_eq!(report.matched, 2);
        assert_eq!(report.dropped_vehicles, 1);
        assert!(report.has_losses());
        assert_eq!(rows[0].vehicle.vehicle_reference, 1);
        assert_eq!(rows[1].vehicle.vehicle_reference, 2);
        assert!(rows.iter().all(|row| row.casualty.is_some()));
        assert!(rows.iter().all(|row| row.accident.speed_limit == Some(30)));
    }

    #[test]
    fn test_left_join_keeps_vehicle_without_summary() {
        let vehicles = vec![vehicle("000000001", 1)];
        let (rows, report) = join_year(
            2021,
            vehicles,
            &BTreeMap::new(),
            vec![accident("000000001", 20)],
        );
        assert_eq!(rows.len(), 1);
        assert!(rows[0].casualty.is_none());
        assert_eq!(report.unmatched_summaries, 1);
        assert_eq!(report.dropped_vehicles, 0);
    }

    #[test]
    fn test_duplicate_accident_keeps_first() {
        let vehicles = vec![vehicle("000000001", 1)];
        let (rows, report) = join_year(
            2019,
            vehicles,
            &BTreeMap::new(),
            vec![accident("000000001", 30), accident("000000001", 60)],
        );
        assert_eq!(report.duplicate_accidents, 1);
        assert_eq!(rows[0].accident.speed_limit, Some(30));
    }
}

use serde::{Deserialize, Serialize};

use crate::keys::VehicleKey;
use crate::records::{AccidentRecord, VehicleRecord};
use crate::summary::CasualtySummary;

/// A vehicle linked to its casualty summary and accident context.
///
/// `casualty` is `None` only when the left join found no summary for the
/// vehicle key, which the aggregator's seeding rules out in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    /// Year partition the row was read from.
    pub year: i32,
    pub vehicle: VehicleRecord,
    pub casualty: Option<CasualtySummary>,
    pub accident: AccidentRecord,
}

impl JoinedRow {
    pub fn key(&self) -> VehicleKey {
        self.vehicle.key()
    }

    /// `accident_year` from the vehicle table, falling back to the partition year.
    pub fn accident_year(&self) -> i64 {
        self.vehicle
            .accident_year
            .unwrap_or_else(|| i64::from(self.year))
    }
}

/// Calendar features decomposed from the accident date and time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Seconds since the Unix epoch, interpreting the local time as UTC.
    pub timestamp: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    /// Monday = 0.
    pub dayw: Option<i64>,
    pub hour: Option<i64>,
    /// Seconds since the earliest timestamp of the whole batch.
    pub elapsed_time: Option<f64>,
}

/// Final per-vehicle row, before schema narrowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub joined: JoinedRow,
    pub calendar: CalendarFeatures,
}

impl FeatureRow {
    pub fn vehicle(&self) -> &VehicleRecord {
        &self.joined.vehicle
    }

    pub fn accident(&self) -> &AccidentRecord {
        &self.joined.accident
    }

    pub fn casualty(&self) -> Option<&CasualtySummary> {
        self.joined.casualty.as_ref()
    }

    /// Sort key of the final dataset: (year, accident reference, vehicle reference).
    pub fn sort_key(&self) -> (i64, &str, i64) {
        (
            self.joined.accident_year(),
            self.joined.vehicle.accident_reference.as_str(),
            self.joined.vehicle.vehicle_reference,
        )
    }
}

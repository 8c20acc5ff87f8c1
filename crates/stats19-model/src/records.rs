//! Source records after column selection, key normalization and recoding.
//!
//! Coded attributes are `Option<i64>`: `None` means the value is missing,
//! whether the raw cell was empty, carried the codebook's `-1`, or carried a
//! column-specific "unknown" code.

use serde::{Deserialize, Serialize};

use crate::keys::VehicleKey;

/// One collision event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub accident_reference: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub number_of_vehicles: Option<i64>,
    /// Raw `DD/MM/YYYY` date text.
    pub date: Option<String>,
    /// Raw `HH:MM` time text.
    pub time: Option<String>,
    pub local_authority_district: Option<i64>,
    pub first_road_class: Option<i64>,
    pub road_type: Option<i64>,
    pub speed_limit: Option<i64>,
    pub junction_detail: Option<i64>,
    pub junction_control: Option<i64>,
    pub second_road_class: Option<i64>,
    pub light_conditions: Option<i64>,
    pub weather_conditions: Option<i64>,
    pub road_surface_conditions: Option<i64>,
    pub special_conditions_at_site: Option<i64>,
    pub carriageway_hazards: Option<i64>,
    pub urban_or_rural_area: Option<i64>,
}

/// One vehicle involved in an accident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub accident_reference: String,
    pub vehicle_reference: i64,
    pub accident_year: Option<i64>,
    pub vehicle_type: Option<i64>,
    pub towing_and_articulation: Option<i64>,
    pub vehicle_manoeuvre: Option<i64>,
    pub vehicle_location_restricted_lane: Option<i64>,
    pub junction_location: Option<i64>,
    pub skidding_and_overturning: Option<i64>,
    pub hit_object_in_carriageway: Option<i64>,
    pub vehicle_leaving_carriageway: Option<i64>,
    pub hit_object_off_carriageway: Option<i64>,
    pub first_point_of_impact: Option<i64>,
    pub vehicle_left_hand_drive: Option<i64>,
    pub journey_purpose_of_driver: Option<i64>,
    pub sex_of_driver: Option<i64>,
    pub age_of_driver: Option<i64>,
    pub engine_capacity_cc: Option<i64>,
    pub propulsion_code: Option<i64>,
    pub age_of_vehicle: Option<i64>,
    pub driver_imd_decile: Option<i64>,
    pub driver_home_area_type: Option<i64>,
}

impl VehicleRecord {
    pub fn key(&self) -> VehicleKey {
        VehicleKey::new(self.accident_reference.clone(), self.vehicle_reference)
    }
}

/// One injured or killed person, attributed to a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasualtyRecord {
    pub accident_reference: String,
    pub vehicle_reference: i64,
    pub casualty_reference: Option<i64>,
    /// 1 driver/rider, 2 passenger, 3 pedestrian.
    pub casualty_class: Option<i64>,
    pub sex_of_casualty: Option<i64>,
    pub age_of_casualty: Option<i64>,
    /// 1 fatal, 2 serious, 3 slight.
    pub casualty_severity: Option<i64>,
    pub casualty_type: Option<i64>,
}

impl CasualtyRecord {
    pub fn key(&self) -> VehicleKey {
        VehicleKey::new(self.accident_reference.clone(), self.vehicle_reference)
    }
}

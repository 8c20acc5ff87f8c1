//! Per-table column drop lists.
//!
//! Columns are removed before any join. Dropping is by name, so a column
//! that a given release does not ship is simply skipped.

use polars::prelude::DataFrame;
use stats19_model::TableKind;

use crate::error::Result;

/// Accident columns with no use downstream. `accident_year` is dropped here
/// because the vehicle table carries it.
pub const ACCIDENT_DROPPED_COLUMNS: &[&str] = &[
    "accident_index",
    "accident_year",
    "local_authority_ons_district",
    "location_northing_osgr",
    "location_easting_osgr",
    "police_force",
    "accident_severity",
    "pedestrian_crossing_human_control",
    "pedestrian_crossing_physical_facilities",
    "did_police_officer_attend_scene_of_accident",
    "lsoa_of_accident_location",
    "trunk_road_flag",
    "first_road_number",
    "second_road_number",
    "local_authority_highway",
    "day_of_week",
    "number_of_casualties",
];

pub const VEHICLE_DROPPED_COLUMNS: &[&str] = &[
    "accident_index",
    "age_band_of_driver",
    "vehicle_direction_from",
    "vehicle_direction_to",
    "generic_make_model",
    "lsoa_of_driver",
];

pub const CASUALTY_DROPPED_COLUMNS: &[&str] = &[
    "accident_index",
    "accident_year",
    "pedestrian_location",
    "pedestrian_movement",
    "pedestrian_road_maintenance_worker",
    "casualty_imd_decile",
    "casualty_home_area_type",
    "lsoa_of_casualty",
    "bus_or_coach_passenger",
    "car_passenger",
    "age_band_of_casualty",
];

pub fn dropped_columns(kind: TableKind) -> &'static [&'static str] {
    match kind {
        TableKind::Accident => ACCIDENT_DROPPED_COLUMNS,
        TableKind::Vehicle => VEHICLE_DROPPED_COLUMNS,
        TableKind::Casualty => CASUALTY_DROPPED_COLUMNS,
    }
}

/// Projects `df` onto every column not on the drop list of `kind`, keeping
/// the source column order.
pub fn select_columns(df: &DataFrame, kind: TableKind) -> Result<DataFrame> {
    let dropped = dropped_columns(kind);
    let kept: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| !dropped.contains(&name.as_str()))
        .collect();
    tracing::debug!(
        kind = %kind,
        kept = kept.len(),
        dropped = df.width() - kept.len(),
        "selected columns"
    );
    Ok(df.select(kept)?)
}

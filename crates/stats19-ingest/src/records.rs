//! Frame to typed record conversion.
//!
//! Key columns are required. Attribute columns a release does not ship are
//! read as all-missing and reported once per table.

use polars::prelude::DataFrame;
use stats19_common::{code_column, f64_column, text_column};
use stats19_model::{AccidentRecord, CasualtyRecord, TableKind, VehicleRecord};
use tracing::warn;

use crate::error::{IngestError, Result};

pub const ACCIDENT_REFERENCE: &str = "accident_reference";
pub const VEHICLE_REFERENCE: &str = "vehicle_reference";

/// Column access bound to one source table, for error and log context.
struct TableReader<'a> {
    df: &'a DataFrame,
    kind: TableKind,
    year: i32,
}

impl<'a> TableReader<'a> {
    fn new(df: &'a DataFrame, kind: TableKind, year: i32) -> Self {
        Self { df, kind, year }
    }

    fn has(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.has(name) {
            Ok(())
        } else {
            Err(IngestError::MissingColumn {
                column: name.to_string(),
                kind: self.kind,
                year: self.year,
            })
        }
    }

    fn absent(&self, name: &str) {
        warn!(
            year = self.year,
            kind = %self.kind,
            column = name,
            "column not present, reading as missing"
        );
    }

    fn text(&self, name: &str) -> Result<Vec<String>> {
        self.require(name)?;
        Ok(text_column(self.df, name)?)
    }

    fn optional_text(&self, name: &str) -> Result<Vec<Option<String>>> {
        if !self.has(name) {
            self.absent(name);
            return Ok(vec![None; self.df.height()]);
        }
        Ok(text_column(self.df, name)?
            .into_iter()
            .map(|value| (!value.is_empty()).then_some(value))
            .collect())
    }

    fn code(&self, name: &str) -> Result<Vec<Option<i64>>> {
        if !self.has(name) {
            self.absent(name);
            return Ok(vec![None; self.df.height()]);
        }
        Ok(code_column(self.df, name)?)
    }

    fn real(&self, name: &str) -> Result<Vec<Option<f64>>> {
        if !self.has(name) {
            self.absent(name);
            return Ok(vec![None; self.df.height()]);
        }
        Ok(f64_column(self.df, name)?)
    }
}

/// Row keys, with rows lacking a usable key skipped and counted.
struct KeyedRows {
    references: Vec<String>,
    vehicles: Vec<Option<i64>>,
}

impl KeyedRows {
    fn read(reader: &TableReader<'_>, with_vehicle: bool) -> Result<Self> {
        let references = reader.text(ACCIDENT_REFERENCE)?;
        let vehicles = if with_vehicle {
            reader.require(VEHICLE_REFERENCE)?;
            reader.code(VEHICLE_REFERENCE)?
        } else {
            vec![Some(0); references.len()]
        };
        Ok(Self {
            references,
            vehicles,
        })
    }

    /// Indices of rows whose key is complete.
    fn valid_rows(&self, reader: &TableReader<'_>) -> Vec<usize> {
        let valid: Vec<usize> = (0..self.references.len())
            .filter(|&idx| !self.references[idx].is_empty() && self.vehicles[idx].is_some())
            .collect();
        let skipped = self.references.len() - valid.len();
        if skipped > 0 {
            warn!(
                year = reader.year,
                kind = %reader.kind,
                skipped,
                "skipped rows without a usable key"
            );
        }
        valid
    }
}

pub fn accident_records(df: &DataFrame, year: i32) -> Result<Vec<AccidentRecord>> {
    let reader = TableReader::new(df, TableKind::Accident, year);
    let keys = KeyedRows::read(&reader, false)?;

    let longitude = reader.real("longitude")?;
    let latitude = reader.real("latitude")?;
    let number_of_vehicles = reader.code("number_of_vehicles")?;
    let date = reader.optional_text("date")?;
    let time = reader.optional_text("time")?;
    let local_authority_district = reader.code("local_authority_district")?;
    let first_road_class = reader.code("first_road_class")?;
    let road_type = reader.code("road_type")?;
    let speed_limit = reader.code("speed_limit")?;
    let junction_detail = reader.code("junction_detail")?;
    let junction_control = reader.code("junction_control")?;
    let second_road_class = reader.code("second_road_class")?;
    let light_conditions = reader.code("light_conditions")?;
    let weather_conditions = reader.code("weather_conditions")?;
    let road_surface_conditions = reader.code("road_surface_conditions")?;
    let special_conditions_at_site = reader.code("special_conditions_at_site")?;
    let carriageway_hazards = reader.code("carriageway_hazards")?;
    let urban_or_rural_area = reader.code("urban_or_rural_area")?;

    Ok(keys
        .valid_rows(&reader)
        .into_iter()
        .map(|idx| AccidentRecord {
            accident_reference: keys.references[idx].clone(),
            longitude: longitude[idx],
            latitude: latitude[idx],
            number_of_vehicles: number_of_vehicles[idx],
            date: date[idx].clone(),
            time: time[idx].clone(),
            local_authority_district: local_authority_district[idx],
            first_road_class: first_road_class[idx],
            road_type: road_type[idx],
            speed_limit: speed_limit[idx],
            junction_detail: junction_detail[idx],
            junction_control: junction_control[idx],
            second_road_class: second_road_class[idx],
            light_conditions: light_conditions[idx],
            weather_conditions: weather_conditions[idx],
            road_surface_conditions: road_surface_conditions[idx],
            special_conditions_at_site: special_conditions_at_site[idx],
            carriageway_hazards: carriageway_hazards[idx],
            urban_or_rural_area: urban_or_rural_area[idx],
        })
        .collect())
}

pub fn vehicle_records(df: &DataFrame, year: i32) -> Result<Vec<VehicleRecord>> {
    let reader = TableReader::new(df, TableKind::Vehicle, year);
    let keys = KeyedRows::read(&reader, true)?;

    let accident_year = reader.code("accident_year")?;
    let vehicle_type = reader.code("vehicle_type")?;
    let towing_and_articulation = reader.code("towing_and_articulation")?;
    let vehicle_manoeuvre = reader.code("vehicle_manoeuvre")?;
    let vehicle_location_restricted_lane = reader.code("vehicle_location_restricted_lane")?;
    let junction_location = reader.code("junction_location")?;
    let skidding_and_overturning = reader.code("skidding_and_overturning")?;
    let hit_object_in_carriageway = reader.code("hit_object_in_carriageway")?;
    let vehicle_leaving_carriageway = reader.code("vehicle_leaving_carriageway")?;
    let hit_object_off_carriageway = reader.code("hit_object_off_carriageway")?;
    let first_point_of_impact = reader.code("first_point_of_impact")?;
    let vehicle_left_hand_drive = reader.code("vehicle_left_hand_drive")?;
    let journey_purpose_of_driver = reader.code("journey_purpose_of_driver")?;
    let sex_of_driver = reader.code("sex_of_driver")?;
    let age_of_driver = reader.code("age_of_driver")?;
    let engine_capacity_cc = reader.code("engine_capacity_cc")?;
    let propulsion_code = reader.code("propulsion_code")?;
    let age_of_vehicle = reader.code("age_of_vehicle")?;
    let driver_imd_decile = reader.code("driver_imd_decile")?;
    let driver_home_area_type = reader.code("driver_home_area_type")?;

    Ok(keys
        .valid_rows(&reader)
        .into_iter()
        .map(|idx| VehicleRecord {
            accident_reference: keys.references[idx].clone(),
            vehicle_reference: keys.vehicles[idx].unwrap_or_default(),
            accident_year: accident_year[idx],
            vehicle_type: vehicle_type[idx],
            towing_and_articulation: towing_and_articulation[idx],
            vehicle_manoeuvre: vehicle_manoeuvre[idx],
            vehicle_location_restricted_lane: vehicle_location_restricted_lane[idx],
            junction_location: junction_location[idx],
            skidding_and_overturning: skidding_and_overturning[idx],
            hit_object_in_carriageway: hit_object_in_carriageway[idx],
            vehicle_leaving_carriageway: vehicle_leaving_carriageway[idx],
            hit_object_off_carriageway: hit_object_off_carriageway[idx],
            first_point_of_impact: first_point_of_impact[idx],
            vehicle_left_hand_drive: vehicle_left_hand_drive[idx],
            journey_purpose_of_driver: journey_purpose_of_driver[idx],
            sex_of_driver: sex_of_driver[idx],
            age_of_driver: age_of_driver[idx],
            engine_capacity_cc: engine_capacity_cc[idx],
            propulsion_code: propulsion_code[idx],
            age_of_vehicle: age_of_vehicle[idx],
            driver_imd_decile: driver_imd_decile[idx],
            driver_home_area_type: driver_home_area_type[idx],
        })
        .collect())
}

pub fn casualty_records(df: &DataFrame, year: i32) -> Result<Vec<CasualtyRecord>> {
    let reader = TableReader::new(df, TableKind::Casualty, year);
    let keys = KeyedRows::read(&reader, true)?;

    let casualty_reference = reader.code("casualty_reference")?;
    let casualty_class = reader.code("casualty_class")?;
    let sex_of_casualty = reader.code("sex_of_casualty")?;
    let age_of_casualty = reader.code("age_of_casualty")?;
    let casualty_severity = reader.code("casualty_severity")?;
    let casualty_type = reader.code("casualty_type")?;

    Ok(keys
        .valid_rows(&reader)
        .into_iter()
        .map(|idx| CasualtyRecord {
            accident_reference: keys.references[idx].clone(),
            vehicle_reference: keys.vehicles[idx].unwrap_or_default(),
            casualty_reference: casualty_reference[idx],
            casualty_class: casualty_class[idx],
            sex_of_casualty: sex_of_casualty[idx],
            age_of_casualty: age_of_casualty[idx],
            casualty_severity: casualty_severity[idx],
            casualty_type: casualty_type[idx],
        })
        .collect())
}

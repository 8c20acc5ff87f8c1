use std::time::Instant;

use polars::prelude::DataFrame;
use stats19_model::{AccidentRecord, CasualtyRecord, TableKind, VehicleRecord};
use tracing::{debug, info, info_span};

use crate::error::Result;
use crate::keys::normalize_key_column;
use crate::records::{ACCIDENT_REFERENCE, accident_records, casualty_records, vehicle_records};
use crate::select::select_columns;
use crate::source::TableSource;

/// The three source tables of one year, as typed records in read order.
#[derive(Debug, Clone, Default)]
pub struct YearTables {
    pub year: i32,
    pub accidents: Vec<AccidentRecord>,
    pub vehicles: Vec<VehicleRecord>,
    pub casualties: Vec<CasualtyRecord>,
}

/// Reads, projects and key-normalizes one table.
pub fn prepare_table(source: &dyn TableSource, year: i32, kind: TableKind) -> Result<DataFrame> {
    let raw = source.read_table(year, kind)?;
    let mut df = select_columns(&raw, kind)?;
    if df.column(ACCIDENT_REFERENCE).is_ok() {
        normalize_key_column(&mut df, ACCIDENT_REFERENCE)?;
    }
    debug!(year, kind = %kind, rows = df.height(), columns = df.width(), "prepared table");
    Ok(df)
}

/// Loads the accident, vehicle and casualty tables of `year`.
pub fn load_year(source: &dyn TableSource, year: i32) -> Result<YearTables> {
    let span = info_span!("load_year", year);
    let _guard = span.enter();
    let start = Instant::now();

    let accidents = accident_records(&prepare_table(source, year, TableKind::Accident)?, year)?;
    let vehicles = vehicle_records(&prepare_table(source, year, TableKind::Vehicle)?, year)?;
    let casualties = casualty_records(&prepare_table(source, year, TableKind::Casualty)?, year)?;

    info!(
        year,
        accidents = accidents.len(),
        vehicles = vehicles.len(),
        casualties = casualties.len(),
        duration_ms = start.elapsed().as_millis(),
        "loaded year"
    );
    Ok(YearTables {
        year,
        accidents,
        vehicles,
        casualties,
    })
}

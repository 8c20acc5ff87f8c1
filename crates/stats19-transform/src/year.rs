use std::time::Instant;

use serde::Serialize;
use stats19_ingest::YearTables;
use stats19_model::{AggregationOptions, JoinedRow};
use tracing::{info, info_span};

use crate::aggregate::{AggregateReport, aggregate_casualties};
use crate::join::{JoinReport, join_year};
use crate::recode::{recode_accident, recode_casualty, recode_vehicle};

/// Joined rows of one year with the counts gathered on the way.
#[derive(Debug, Clone)]
pub struct YearExtract {
    pub rows: Vec<JoinedRow>,
    pub summary: YearSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub aggregate: AggregateReport,
    pub join: JoinReport,
}

impl YearSummary {
    pub fn year(&self) -> i32 {
        self.join.year
    }
}

/// Recodes, aggregates and joins one year of source tables.
pub fn extract_year(mut tables: YearTables, options: &AggregationOptions) -> YearExtract {
    let span = info_span!("extract_year", year = tables.year);
    let _guard = span.enter();
    let start = Instant::now();

    tables.accidents.iter_mut().for_each(recode_accident);
    tables.vehicles.iter_mut().for_each(recode_vehicle);
    tables.casualties.iter_mut().for_each(recode_casualty);

    let (summaries, aggregate) =
        aggregate_casualties(&tables.vehicles, &tables.casualties, options);
    let (rows, join) = join_year(tables.year, tables.vehicles, &summaries, tables.accidents);

    info!(
        year = join.year,
        vehicle_count = join.vehicles,
        matched = join.matched,
        dropped_vehicles = join.dropped_vehicles,
        casualty_rows = aggregate.casualty_rows,
        duration_ms = start.elapsed().as_millis(),
        "extracted year"
    );
    YearExtract {
        rows,
        summary: YearSummary { aggregate, join },
    }
}

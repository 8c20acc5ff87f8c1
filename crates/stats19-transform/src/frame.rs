//! Feature rows to a Polars frame, and the narrowed model frame.
//!
//! [`FEATURE_COLUMNS`] is the one place that maps typed row fields to output
//! column names. Every name the default schema declares must appear here.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Serialize;
use stats19_common::{code_series, f64_series};
use stats19_model::{CasualtySummary, FeatureRow, FeatureSchema};

use crate::error::Result;

type CodeGetter = fn(&FeatureRow) -> Option<i64>;
type RealGetter = fn(&FeatureRow) -> Option<f64>;

#[derive(Clone, Copy)]
pub enum ColumnValues {
    Code(CodeGetter),
    Real(RealGetter),
}

/// One output column of the feature frame.
#[derive(Clone, Copy)]
pub struct FeatureColumn {
    pub name: &'static str,
    pub values: ColumnValues,
}

impl FeatureColumn {
    const fn code(name: &'static str, get: CodeGetter) -> Self {
        Self {
            name,
            values: ColumnValues::Code(get),
        }
    }

    const fn real(name: &'static str, get: RealGetter) -> Self {
        Self {
            name,
            values: ColumnValues::Real(get),
        }
    }

    fn build(&self, rows: &[FeatureRow]) -> Column {
        match self.values {
            ColumnValues::Code(get) => code_series(self.name, rows.iter().map(get).collect()),
            ColumnValues::Real(get) => f64_series(self.name, rows.iter().map(get).collect()),
        }
    }
}

fn summary_code(row: &FeatureRow, get: fn(&CasualtySummary) -> i64) -> Option<i64> {
    row.casualty().map(get)
}

fn class_count(row: &FeatureRow, class: i64) -> Option<i64> {
    row.casualty()
        .and_then(|summary| summary.class_count(class))
        .map(i64::from)
}

fn severity_count(row: &FeatureRow, severity: i64) -> Option<i64> {
    row.casualty()
        .and_then(|summary| summary.severity_count(severity))
        .map(i64::from)
}

/// Columns produced for every row, in frame order. The two auxiliary
/// aggregates are listed in [`AUXILIARY_FEATURE_COLUMNS`].
pub const FEATURE_COLUMNS: &[FeatureColumn] = &[
    // vehicle
    FeatureColumn::code("vehicle_reference", |r| Some(r.vehicle().vehicle_reference)),
    FeatureColumn::code("accident_year", |r| Some(r.joined.accident_year())),
    FeatureColumn::code("vehicle_type", |r| r.vehicle().vehicle_type),
    FeatureColumn::code("towing_and_articulation", |r| {
        r.vehicle().towing_and_articulation
    }),
    FeatureColumn::code("vehicle_manoeuvre", |r| r.vehicle().vehicle_manoeuvre),
    FeatureColumn::code("vehicle_location_restricted_lane", |r| {
        r.vehicle().vehicle_location_restricted_lane
    }),
    FeatureColumn::code("junction_location", |r| r.vehicle().junction_location),
    FeatureColumn::code("skidding_and_overturning", |r| {
        r.vehicle().skidding_and_overturning
    }),
    FeatureColumn::code("hit_object_in_carriageway", |r| {
        r.vehicle().hit_object_in_carriageway
    }),
    FeatureColumn::code("vehicle_leaving_carriageway", |r| {
        r.vehicle().vehicle_leaving_carriageway
    }),
    FeatureColumn::code("hit_object_off_carriageway", |r| {
        r.vehicle().hit_object_off_carriageway
    }),
    FeatureColumn::code("first_point_of_impact", |r| r.vehicle().first_point_of_impact),
    FeatureColumn::code("vehicle_left_hand_drive", |r| {
        r.vehicle().vehicle_left_hand_drive
    }),
    FeatureColumn::code("journey_purpose_of_driver", |r| {
        r.vehicle().journey_purpose_of_driver
    }),
    FeatureColumn::code("sex_of_driver", |r| r.vehicle().sex_of_driver),
    FeatureColumn::code("age_of_driver", |r| r.vehicle().age_of_driver),
    FeatureColumn::code("engine_capacity_cc", |r| r.vehicle().engine_capacity_cc),
    FeatureColumn::code("propulsion_code", |r| r.vehicle().propulsion_code),
    FeatureColumn::code("age_of_vehicle", |r| r.vehicle().age_of_vehicle),
    FeatureColumn::code("driver_imd_decile", |r| r.vehicle().driver_imd_decile),
    FeatureColumn::code("driver_home_area_type", |r| r.vehicle().driver_home_area_type),
    // casualty summary
    FeatureColumn::code("casualty_class_0", |r| class_count(r, 0)),
    FeatureColumn::code("casualty_class_1", |r| class_count(r, 1)),
    FeatureColumn::code("casualty_class_2", |r| class_count(r, 2)),
    FeatureColumn::code("casualty_class_3", |r| class_count(r, 3)),
    FeatureColumn::code("casualty_severity_1", |r| severity_count(r, 1)),
    FeatureColumn::code("casualty_severity_2", |r| severity_count(r, 2)),
    FeatureColumn::code("casualty_severity_3", |r| severity_count(r, 3)),
    FeatureColumn::code("casualty_severity_4", |r| severity_count(r, 4)),
    FeatureColumn::code("casualty_total", |r| {
        r.casualty().map(|summary| i64::from(summary.casualty_total))
    }),
    FeatureColumn::code("worst_severity", |r| summary_code(r, |s| s.worst_severity)),
    FeatureColumn::code("casualty_worst", |r| summary_code(r, |s| s.casualty_worst)),
    FeatureColumn::code("casualty_modal_type", |r| {
        r.casualty().and_then(|summary| summary.casualty_modal_type)
    }),
    // accident
    FeatureColumn::real("longitude", |r| r.accident().longitude),
    FeatureColumn::real("latitude", |r| r.accident().latitude),
    FeatureColumn::code("number_of_vehicles", |r| r.accident().number_of_vehicles),
    FeatureColumn::code("local_authority_district", |r| {
        r.accident().local_authority_district
    }),
    FeatureColumn::code("first_road_class", |r| r.accident().first_road_class),
    FeatureColumn::code("road_type", |r| r.accident().road_type),
    FeatureColumn::code("speed_limit", |r| r.accident().speed_limit),
    FeatureColumn::code("junction_detail", |r| r.accident().junction_detail),
    FeatureColumn::code("junction_control", |r| r.accident().junction_control),
    FeatureColumn::code("second_road_class", |r| r.accident().second_road_class),
    FeatureColumn::code("light_conditions", |r| r.accident().light_conditions),
    FeatureColumn::code("weather_conditions", |r| r.accident().weather_conditions),
    FeatureColumn::code("road_surface_conditions", |r| {
        r.accident().road_surface_conditions
    }),
    FeatureColumn::code("special_conditions_at_site", |r| {
        r.accident().special_conditions_at_site
    }),
    FeatureColumn::code("carriageway_hazards", |r| r.accident().carriageway_hazards),
    FeatureColumn::code("urban_or_rural_area", |r| r.accident().urban_or_rural_area),
    // calendar
    FeatureColumn::code("month", |r| r.calendar.month),
    FeatureColumn::code("day", |r| r.calendar.day),
    FeatureColumn::code("dayw", |r| r.calendar.dayw),
    FeatureColumn::code("hour", |r| r.calendar.hour),
    FeatureColumn::real("elapsed_time", |r| r.calendar.elapsed_time),
];

pub const AUXILIARY_FEATURE_COLUMNS: &[FeatureColumn] = &[
    FeatureColumn::real("casualty_mean_age", |r| {
        r.casualty().and_then(|summary| summary.casualty_mean_age)
    }),
    FeatureColumn::real("casualty_share_male", |r| {
        r.casualty().and_then(|summary| summary.casualty_share_male)
    }),
];

/// Builds the wide feature frame: accident reference first, then
/// [`FEATURE_COLUMNS`], then the auxiliary aggregates when requested.
pub fn feature_frame(rows: &[FeatureRow], include_auxiliary: bool) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(FEATURE_COLUMNS.len() + 3);
    columns.push(
        Series::new(
            "accident_reference".into(),
            rows.iter()
                .map(|row| row.vehicle().accident_reference.clone())
                .collect::<Vec<_>>(),
        )
        .into_column(),
    );
    columns.extend(FEATURE_COLUMNS.iter().map(|column| column.build(rows)));
    if include_auxiliary {
        columns.extend(AUXILIARY_FEATURE_COLUMNS.iter().map(|column| column.build(rows)));
    }
    Ok(DataFrame::new(columns)?)
}

/// The narrowed frame handed to imputation and output.
///
/// Column order is categorical, numerical, target, as declared by `schema`.
#[derive(Debug, Clone)]
pub struct ModelFrame {
    pub data: DataFrame,
    pub schema: FeatureSchema,
    /// Sorted distinct codes of each categorical column.
    pub levels: BTreeMap<String, Vec<i64>>,
}

/// Schema listing written next to the output dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    pub rows: usize,
    pub categorical: Vec<CategoricalColumn>,
    pub numerical: Vec<String>,
    pub target: String,
    pub imputed_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub levels: Vec<i64>,
    pub missing: usize,
}

impl ModelFrame {
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn levels_of(&self, column: &str) -> &[i64] {
        self.levels.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Null count of `column`; zero for unknown columns.
    pub fn missing_count(&self, column: &str) -> usize {
        self.data
            .column(column)
            .map(|column| column.null_count())
            .unwrap_or(0)
    }

    pub fn schema_report(&self) -> SchemaReport {
        SchemaReport {
            rows: self.record_count(),
            categorical: self
                .schema
                .categorical
                .iter()
                .map(|name| CategoricalColumn {
                    name: name.clone(),
                    levels: self.levels_of(name).to_vec(),
                    missing: self.missing_count(name),
                })
                .collect(),
            numerical: self.schema.numerical.clone(),
            target: self.schema.target.clone(),
            imputed_label: self.schema.imputed_label.clone(),
        }
    }
}

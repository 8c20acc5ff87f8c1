//! Declared output schema: which final columns are categorical, which are
//! numerical, and which one is the target.
//!
//! The column lists must stay in lockstep with the feature frame builder;
//! a declared column the frame does not produce is a hard error at
//! partition time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Binary worst-severity label.
pub const TARGET_COLUMN: &str = "casualty_worst";

/// Categorical column that is structurally missing for vehicles without an
/// eligible casualty and is filled in by the imputation step.
pub const IMPUTED_LABEL_COLUMN: &str = "casualty_modal_type";

pub const DEFAULT_CATEGORICAL_COLUMNS: &[&str] = &[
    "vehicle_type",
    "towing_and_articulation",
    "vehicle_manoeuvre",
    "vehicle_location_restricted_lane",
    "junction_location",
    "skidding_and_overturning",
    "hit_object_in_carriageway",
    "vehicle_leaving_carriageway",
    "hit_object_off_carriageway",
    "first_point_of_impact",
    "vehicle_left_hand_drive",
    "journey_purpose_of_driver",
    "sex_of_driver",
    "propulsion_code",
    "driver_home_area_type",
    "casualty_modal_type",
    "local_authority_district",
    "first_road_class",
    "road_type",
    "junction_detail",
    "junction_control",
    "second_road_class",
    "light_conditions",
    "weather_conditions",
    "road_surface_conditions",
    "special_conditions_at_site",
    "carriageway_hazards",
    "urban_or_rural_area",
];

pub const DEFAULT_NUMERICAL_COLUMNS: &[&str] = &[
    "accident_year",
    "age_of_driver",
    "engine_capacity_cc",
    "age_of_vehicle",
    "driver_imd_decile",
    "longitude",
    "latitude",
    "number_of_vehicles",
    "speed_limit",
    "casualty_class_1",
    "casualty_class_2",
    "casualty_class_3",
    "casualty_total",
    "month",
    "day",
    "dayw",
    "hour",
    "elapsed_time",
];

/// Numerical columns added when auxiliary casualty aggregates are enabled.
pub const AUXILIARY_COLUMNS: &[&str] = &["casualty_mean_age", "casualty_share_male"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Categorical,
    Numerical,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub categorical: Vec<String>,
    pub numerical: Vec<String>,
    pub target: String,
    /// Categorical column back-filled by the imputation step.
    pub imputed_label: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            categorical: to_owned(DEFAULT_CATEGORICAL_COLUMNS),
            numerical: to_owned(DEFAULT_NUMERICAL_COLUMNS),
            target: TARGET_COLUMN.to_string(),
            imputed_label: IMPUTED_LABEL_COLUMN.to_string(),
        }
    }
}

impl FeatureSchema {
    /// Default schema, optionally extended with the auxiliary aggregates.
    pub fn with_auxiliary(include_auxiliary: bool) -> Self {
        let mut schema = Self::default();
        if include_auxiliary {
            schema.numerical.extend(to_owned(AUXILIARY_COLUMNS));
        }
        schema
    }

    /// All output columns in order: categorical, numerical, target.
    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.categorical
            .iter()
            .map(|name| (name.as_str(), ColumnRole::Categorical))
            .chain(
                self.numerical
                    .iter()
                    .map(|name| (name.as_str(), ColumnRole::Numerical)),
            )
            .chain(std::iter::once((self.target.as_str(), ColumnRole::Target)))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns().map(|(name, _)| name).collect()
    }

    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        self.columns()
            .find(|(name, _)| *name == column)
            .map(|(_, role)| role)
    }

    pub fn column_count(&self) -> usize {
        self.categorical.len() + self.numerical.len() + 1
    }

    /// Checks that no column is declared twice and that the imputed label is
    /// one of the categorical columns.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for (name, _) in self.columns() {
            if !seen.insert(name) {
                return Err(ModelError::DuplicateColumn {
                    column: name.to_string(),
                });
            }
        }
        if self.role_of(&self.imputed_label) != Some(ColumnRole::Categorical) {
            return Err(ModelError::LabelNotCategorical {
                column: self.imputed_label.clone(),
            });
        }
        Ok(())
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_is_valid() {
        FeatureSchema::default().validate().expect("default schema");
    }

    #[test]
    fn target_is_last_column() {
        let schema = FeatureSchema::default();
        let names = schema.column_names();
        assert_eq!(names.last(), Some(&TARGET_COLUMN));
        assert_eq!(names.len(), schema.column_count());
    }

    #[test]
    fn auxiliary_columns_are_numerical() {
        let schema = FeatureSchema::with_auxiliary(true);
        assert_eq!(
            schema.role_of("casualty_mean_age"),
            Some(ColumnRole::Numerical)
        );
        assert_eq!(FeatureSchema::with_auxiliary(false).role_of("casualty_mean_age"), None);
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let mut schema = FeatureSchema::default();
        schema.numerical.push("vehicle_type".to_string());
        assert!(matches!(
            schema.validate(),
            Err(ModelError::DuplicateColumn { column }) if column == "vehicle_type"
        ));
    }

    #[test]
    fn imputed_label_must_be_categorical() {
        let mut schema = FeatureSchema::default();
        schema.categorical.retain(|name| name != IMPUTED_LABEL_COLUMN);
        assert!(matches!(
            schema.validate(),
            Err(ModelError::LabelNotCategorical { .. })
        ));
    }
}

//! Data model for the road casualty dataset builder.
//!
//! Every pipeline stage hands the next one a typed record rather than a
//! loosely-named row, so a renamed field breaks the build instead of silently
//! dropping a column:
//!
//! - [`AccidentRecord`], [`VehicleRecord`], [`CasualtyRecord`]: recoded source rows
//! - [`CasualtySummary`]: person-level casualties reduced to one vehicle
//! - [`JoinedRow`]: vehicle + casualty summary + accident context for one year
//! - [`FeatureRow`]: joined row plus engineered calendar features
//!
//! The final column contract lives in [`FeatureSchema`].

pub mod error;
pub mod keys;
pub mod options;
pub mod records;
pub mod row;
pub mod schema;
pub mod summary;
pub mod table;

pub use error::{ModelError, Result};
pub use keys::{ACCIDENT_REFERENCE_WIDTH, VehicleKey};
pub use options::{
    AggregationOptions, ImputationOptions, MissingMarker, PipelineOptions, SchemaOverrides,
};
pub use records::{AccidentRecord, CasualtyRecord, VehicleRecord};
pub use row::{CalendarFeatures, FeatureRow, JoinedRow};
pub use schema::{
    ColumnRole, DEFAULT_CATEGORICAL_COLUMNS, DEFAULT_NUMERICAL_COLUMNS, AUXILIARY_COLUMNS,
    FeatureSchema, IMPUTED_LABEL_COLUMN, TARGET_COLUMN,
};
pub use summary::{
    CasualtySummary, FATAL_SEVERITY, NO_CASUALTY_CLASS, NON_INJURY_SEVERITY, PASSENGER_CLASS,
    SERIOUS_SEVERITY, SLIGHT_SEVERITY,
};
pub use table::TableKind;

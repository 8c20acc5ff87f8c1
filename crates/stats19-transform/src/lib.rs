//! Transform stages of the road casualty dataset builder.
//!
//! - **recode**: constant code tables and sentinel clearing
//! - **aggregate**: person-level casualties reduced to one summary per vehicle
//! - **join**: vehicle ⋈ summary ⋈ accident with coverage reporting
//! - **year**: the three steps above for one year partition
//! - **features**: calendar features, elapsed time and the final sort
//! - **frame**: typed rows to a Polars frame
//! - **partition**: declared categorical/numerical narrowing

pub mod aggregate;
pub mod error;
pub mod features;
pub mod frame;
pub mod join;
pub mod partition;
pub mod recode;
pub mod year;

pub use aggregate::{AggregateReport, aggregate_casualties, modal_code};
pub use error::{Result, SchemaError, TransformError};
pub use features::{FeatureReport, calendar_features, engineer_features, parse_timestamp};
pub use frame::{
    AUXILIARY_FEATURE_COLUMNS, CategoricalColumn, FEATURE_COLUMNS, ModelFrame, SchemaReport,
    feature_frame,
};
pub use join::{JoinReport, join_year};
pub use partition::{distinct_codes, partition};
pub use year::{YearExtract, YearSummary, extract_year};

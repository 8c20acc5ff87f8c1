use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The three source tables of the national casualty statistics extract.
///
/// Granularity decreases from accident to casualty: one accident has many
/// vehicles, one vehicle has zero or more casualties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Accident,
    Vehicle,
    Casualty,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Accident, TableKind::Vehicle, TableKind::Casualty];

    /// Lowercase name as used in the published file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Accident => "accident",
            TableKind::Vehicle => "vehicle",
            TableKind::Casualty => "casualty",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accident" | "collision" => Ok(TableKind::Accident),
            "vehicle" => Ok(TableKind::Vehicle),
            "casualty" => Ok(TableKind::Casualty),
            other => Err(ModelError::UnknownTableKind(other.to_string())),
        }
    }
}

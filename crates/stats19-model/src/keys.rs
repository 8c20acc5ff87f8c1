use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a canonical accident reference (`"000000123"`).
pub const ACCIDENT_REFERENCE_WIDTH: usize = 9;

/// Composite key of a vehicle: the vehicle reference is only unique within
/// its accident.
///
/// Ordering is (accident reference, vehicle reference), which is also the
/// within-year sort order of the final dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleKey {
    pub accident_reference: String,
    pub vehicle_reference: i64,
}

impl VehicleKey {
    pub fn new(accident_reference: impl Into<String>, vehicle_reference: i64) -> Self {
        Self {
            accident_reference: accident_reference.into(),
            vehicle_reference,
        }
    }
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.accident_reference, self.vehicle_reference)
    }
}

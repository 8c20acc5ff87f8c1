use serde::{Deserialize, Serialize};

/// Casualty class assigned to a vehicle with no casualties. Outside the
/// published codebook, which runs 1..=3.
pub const NO_CASUALTY_CLASS: i64 = 0;
pub const PASSENGER_CLASS: i64 = 2;

pub const FATAL_SEVERITY: i64 = 1;
pub const SERIOUS_SEVERITY: i64 = 2;
pub const SLIGHT_SEVERITY: i64 = 3;
/// Severity assigned to a vehicle with no casualties. Outside the published
/// codebook, which runs 1..=3.
pub const NON_INJURY_SEVERITY: i64 = 4;

/// Person-level casualty rows reduced to one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasualtySummary {
    /// Minimum severity code over the vehicle's casualties (1 = fatal).
    pub worst_severity: i64,
    /// Binary label derived from `worst_severity`.
    pub casualty_worst: i64,
    /// Most frequent consolidated casualty type, `None` when no eligible
    /// casualty exists.
    pub casualty_modal_type: Option<i64>,
    /// Person rows per casualty class, indexed by class code 0..=3.
    pub class_counts: [u32; 4],
    /// Person rows per severity, indexed by severity code minus one (1..=4).
    pub severity_counts: [u32; 4],
    /// Number of casualty rows attached to the vehicle, 0 for the placeholder.
    pub casualty_total: u32,
    pub casualty_mean_age: Option<f64>,
    pub casualty_share_male: Option<f64>,
}

impl CasualtySummary {
    pub fn class_count(&self, class: i64) -> Option<u32> {
        usize::try_from(class)
            .ok()
            .and_then(|idx| self.class_counts.get(idx).copied())
    }

    pub fn severity_count(&self, severity: i64) -> Option<u32> {
        usize::try_from(severity - 1)
            .ok()
            .and_then(|idx| self.severity_counts.get(idx).copied())
    }

    pub fn has_casualties(&self) -> bool {
        self.casualty_total > 0
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assignment::AssignmentId;
use crate::state_machine::MaintenanceStatus;

/// Prefixed numeric identifier of a maintenance report.
pub type MaintenanceReportId = String;

/// The handler's record of the intervention performed against an assignment.
///
/// Created once by the assigned handler; immutable after creation. A report
/// with status `Finalized` drives the underlying request/report to its
/// terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub id: MaintenanceReportId,
    pub assignment: AssignmentId,
    pub intervention_date: DateTime<Utc>,
    pub status: MaintenanceStatus,
    pub observations: Option<String>,
    pub maintenance_type: String,
    pub is_approved: bool,
    /// Opaque reference to the intervention images blob
    pub images: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Handler-supplied fields of a new maintenance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSubmission {
    pub assignment: AssignmentId,
    pub intervention_date: DateTime<Utc>,
    pub status: MaintenanceStatus,
    pub observations: Option<String>,
    pub maintenance_type: String,
    pub is_approved: bool,
    pub images: Option<String>,
}

impl MaintenanceSubmission {
    /// At least one of observations/images must describe the intervention
    pub fn has_evidence(&self) -> bool {
        self.observations.as_deref().is_some_and(|o| !o.is_empty())
            || self.images.as_deref().is_some_and(|i| !i.is_empty())
    }
}

//! # Data Layer
//!
//! Persisted entities of the lifecycle engine: requests/reports, assignments,
//! maintenance reports, and the append-only status transition audit trail.

pub mod assignment;
pub mod maintenance;
pub mod request_report;
pub mod transition;

pub use assignment::{Assignment, AssignmentId, AssignmentTarget};
pub use maintenance::{MaintenanceReport, MaintenanceReportId, MaintenanceSubmission};
pub use request_report::{
    CancelType, LotId, PlotId, RequestDraft, RequestId, RequestKind, RequestReport, UserId,
};
pub use transition::StatusTransition;

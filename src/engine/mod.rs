//! # Lifecycle Engine
//!
//! The three operational components of the request/report lifecycle:
//!
//! - [`RequestReportStore`] — creation and status transitions, including the
//!   valve write-back when a flow decision is approved;
//! - [`AssignmentCoordinator`] — delegation of requests/reports to handlers;
//! - [`MaintenanceResolutionEngine`] — resolution of assignments through
//!   maintenance reports, driving the underlying item to its terminal state.
//!
//! Each component validates, mutates through the storage layer, then raises
//! exactly one lifecycle event. Notification failures are logged and never
//! propagated; a lost notification does not roll back a committed change.

pub mod assignment_coordinator;
pub mod maintenance_resolution;
pub mod request_store;

pub use assignment_coordinator::AssignmentCoordinator;
pub use maintenance_resolution::MaintenanceResolutionEngine;
pub use request_store::RequestReportStore;

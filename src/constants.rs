//! # System Constants
//!
//! Core constants that define the operational boundaries of the request/report
//! lifecycle engine: flow limits, observation length bounds, identifier
//! prefixes and event channel sizing.

/// Lower bound (inclusive) for a requested flow, in litres per second.
pub const REQUESTED_FLOW_MIN: f64 = 1.0;

/// Upper bound (exclusive) for a requested flow, in litres per second.
pub const REQUESTED_FLOW_MAX: f64 = 11.7;

/// Observation length bounds for water supply failure reports.
pub const WATER_FAILURE_OBSERVATIONS_MIN: usize = 1;
pub const WATER_FAILURE_OBSERVATIONS_MAX: usize = 200;

/// Observation length bounds for application failure reports.
pub const APP_FAILURE_OBSERVATIONS_MIN: usize = 10;
pub const APP_FAILURE_OBSERVATIONS_MAX: usize = 200;

/// Observation length bounds for flow cancellation requests.
pub const FLOW_CANCEL_OBSERVATIONS_MIN: usize = 5;
pub const FLOW_CANCEL_OBSERVATIONS_MAX: usize = 200;

/// Identifier prefixes of the district's numbering scheme.
/// Generated ids are `<prefix><6 digest digits>`.
pub mod id_prefixes {
    pub const FLOW_REQUEST: &str = "10";
    pub const FAILURE_REPORT: &str = "20";
    pub const ASSIGNMENT: &str = "30";
    pub const MAINTENANCE_REPORT: &str = "40";
}

/// Lifecycle event names raised towards the notification dispatcher.
pub mod events {
    pub const REQUEST_CREATED: &str = "request.created";
    pub const REQUEST_STATUS_CHANGED: &str = "request.status_changed";
    pub const REQUEST_ASSIGNED: &str = "request.assigned";
    pub const REQUEST_RESOLVED: &str = "request.resolved";
}

/// Capabilities resolved through the external authorization layer.
pub mod capabilities {
    pub const CAN_ASSIGN: &str = "can_assign";
    pub const CAN_BE_ASSIGNED: &str = "can_be_assigned";
}

/// Default capacity of the broadcast channel behind the event publisher.
pub const EVENT_CHANNEL_CAPACITY: usize = 1000;

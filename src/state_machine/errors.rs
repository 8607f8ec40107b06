use crate::models::request_report::RequestId;
use thiserror::Error;

/// Validation failures detected before any state is mutated.
///
/// Ordering of the checks is fixed (see [`crate::validation`]); the first
/// failing check wins so error messages are reproducible.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("A lot or plot reference is required for this kind of request")]
    MissingAssociation,

    #[error("This kind of request must not reference a lot or plot")]
    ForbiddenAssociation,

    #[error("The referenced lot or plot is not active")]
    InactiveResource,

    #[error("Only the owner of the plot may file a request for this resource")]
    NotOwner,

    #[error("The lot has no 4\" valve attached")]
    MissingValve,

    #[error("Requested flow {value} L/s is outside the allowed range [{min}, {max})")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("The lot's flow is inactive. Request a flow activation first")]
    FlowInactive,

    #[error("The lot's flow is already active. No activation is needed")]
    FlowAlreadyActive,

    #[error("The lot's flow is already inactive. No temporary cancellation is needed")]
    FlowAlreadyInactive,

    #[error("The requested flow {value} L/s is already being delivered. Try a different value")]
    FlowUnchanged { value: f64 },

    #[error("Observations must be between {min} and {max} characters (got {actual})")]
    ObservationLengthInvalid {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("An unresolved request or report already exists for this resource")]
    DuplicatePending,
}

impl ValidationError {
    /// Stable machine-readable code rendered at the HTTP boundary
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAssociation => "MISSING_ASSOCIATION",
            Self::ForbiddenAssociation => "FORBIDDEN_ASSOCIATION",
            Self::InactiveResource => "INACTIVE_RESOURCE",
            Self::NotOwner => "NOT_OWNER",
            Self::MissingValve => "MISSING_VALVE",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::FlowInactive => "FLOW_INACTIVE",
            Self::FlowAlreadyActive => "FLOW_ALREADY_ACTIVE",
            Self::FlowAlreadyInactive => "FLOW_ALREADY_INACTIVE",
            Self::FlowUnchanged { .. } => "FLOW_UNCHANGED",
            Self::ObservationLengthInvalid { .. } => "OBSERVATION_LENGTH_INVALID",
            Self::DuplicatePending => "DUPLICATE_PENDING",
        }
    }
}

/// Failures of status transitions against stored state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Request or report {0} not found")]
    NotFound(RequestId),

    #[error("Request or report {0} has already been finalized")]
    AlreadyFinalized(RequestId),

    #[error("Invalid transition from {from} on event {event}")]
    InvalidTransition { from: String, event: String },
}

/// Capability check failures resolved through the external authorization layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthzError {
    #[error("User {user} does not hold the '{capability}' capability")]
    Unauthorized { user: String, capability: String },
}

/// Failures of the assignment operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error("A user cannot assign a request or report to themselves")]
    SelfAssignment,

    #[error("This request or report is already assigned to that handler")]
    DuplicateAssignment,

    #[error(transparent)]
    State(#[from] StateError),
}

/// Failures of the maintenance resolution operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Only the assigned handler may file this maintenance report")]
    Unauthorized,

    #[error("Assignment {0} not found")]
    AssignmentNotFound(String),

    #[error("A maintenance report already exists for this assignment")]
    AlreadyResolved,

    #[error("Invalid maintenance report: {0}")]
    InvalidReport(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Resource(#[from] crate::resources::ResourceError),
}

/// Result type aliases for lifecycle operations
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type StateResult<T> = Result<T, StateError>;
pub type AssignResult<T> = Result<T, AssignError>;
pub type ResolveResult<T> = Result<T, ResolveError>;

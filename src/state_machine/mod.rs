// State machine module for the request/report lifecycle.
//
// The resting states of a request/report are Pending, InProgress and the
// terminal trio; the collapsed intermediate states of the ordered progression
// (Assigned, Approved, Rejected) materialize in the append-only audit trail as
// via-hops of a single compare-and-set transition.

pub mod errors;
pub mod events;
pub mod states;

// Re-export main types for convenient access
pub use errors::{
    AssignError, AuthzError, ResolveError, StateError, ValidationError,
};
pub use events::RequestEvent;
pub use states::{MaintenanceStatus, RequestStatus};

use serde::{Deserialize, Serialize};

/// The outcome of planning a transition: the status the entity comes to rest
/// in, plus the intermediate decision status recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPlan {
    /// Intermediate status written to the audit trail, if the progression
    /// passes through one (Assigned, Approved or Rejected)
    pub via: Option<RequestStatus>,
    /// Resting status after the transition
    pub to: RequestStatus,
}

/// Why a transition cannot be planned from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenial {
    /// The entity is in a terminal status (invariant: monotonic status)
    AlreadyFinalized,
    /// The event is not applicable from the current status
    Invalid,
}

/// Determine the target status for an event applied to the current status.
///
/// First assignment passes through `Assigned`; reassignment of an in-progress
/// item stays `InProgress`. Approval and rejection pass through their decision
/// status and come to rest in `Finalized`, from `Pending` (administrative
/// shortcut) or from `InProgress` (resolution path).
pub fn plan_transition(
    current: RequestStatus,
    event: &RequestEvent,
) -> Result<TransitionPlan, TransitionDenial> {
    if current.is_terminal() {
        return Err(TransitionDenial::AlreadyFinalized);
    }

    let plan = match (current, event) {
        (RequestStatus::Pending, RequestEvent::Assign) => TransitionPlan {
            via: Some(RequestStatus::Assigned),
            to: RequestStatus::InProgress,
        },
        (RequestStatus::Assigned | RequestStatus::InProgress, RequestEvent::Assign) => {
            TransitionPlan {
                via: None,
                to: RequestStatus::InProgress,
            }
        }
        (
            RequestStatus::Pending | RequestStatus::Assigned | RequestStatus::InProgress,
            RequestEvent::Approve,
        ) => TransitionPlan {
            via: Some(RequestStatus::Approved),
            to: RequestStatus::Finalized,
        },
        (
            RequestStatus::Pending | RequestStatus::Assigned | RequestStatus::InProgress,
            RequestEvent::Reject(_),
        ) => TransitionPlan {
            via: Some(RequestStatus::Rejected),
            to: RequestStatus::Finalized,
        },
        _ => return Err(TransitionDenial::Invalid),
    };

    Ok(plan)
}

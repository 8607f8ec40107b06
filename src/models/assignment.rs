use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request_report::{RequestId, UserId};

/// Prefixed numeric identifier of an assignment.
pub type AssignmentId = String;

/// The request-or-report an assignment binds to a handler.
///
/// Exactly one of the two references is set, never both, never neither; the
/// enum makes the illegal shapes unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentTarget {
    FlowRequest(RequestId),
    FailureReport(RequestId),
}

impl AssignmentTarget {
    /// The underlying request/report id regardless of flavor
    pub fn request_id(&self) -> &RequestId {
        match self {
            Self::FlowRequest(id) | Self::FailureReport(id) => id,
        }
    }
}

/// The binding of a request/report to a handler responsible for resolving it.
///
/// One assignment per active handling attempt; reassignment creates a new
/// record with `reassigned = true` and never deletes history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub target: AssignmentTarget,
    pub assigned_by: UserId,
    pub assigned_to: UserId,
    /// Set at creation, immutable
    pub assignment_date: DateTime<Utc>,
    /// True iff this assignment supersedes a prior one for the same target
    /// that never reached a maintenance resolution
    pub reassigned: bool,
}

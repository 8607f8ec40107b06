use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request_report::{RequestId, UserId};
use crate::state_machine::RequestStatus;

/// Append-only audit row recording one status change of a request/report.
///
/// Rows are never updated or deleted; the row with the highest `sort_key` for
/// a request carries `most_recent = true` and is the stored source of truth
/// for the current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub request_id: RequestId,
    pub from_status: Option<RequestStatus>,
    pub to_status: RequestStatus,
    /// Name of the event that triggered the transition
    pub event: String,
    /// The user on whose behalf the transition ran
    pub actor: UserId,
    pub sort_key: i32,
    pub most_recent: bool,
    pub occurred_at: DateTime<Utc>,
}

impl StatusTransition {
    pub fn new(
        request_id: RequestId,
        from_status: Option<RequestStatus>,
        to_status: RequestStatus,
        event: impl Into<String>,
        actor: UserId,
        sort_key: i32,
    ) -> Self {
        Self {
            request_id,
            from_status,
            to_status,
            event: event.into(),
            actor,
            sort_key,
            most_recent: true,
            occurred_at: Utc::now(),
        }
    }
}

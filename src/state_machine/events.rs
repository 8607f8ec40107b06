use serde::{Deserialize, Serialize};

/// Events that can trigger request/report state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RequestEvent {
    /// Bind the request/report to a handler and start work
    Assign,
    /// Finalize with a positive decision
    Approve,
    /// Finalize with a negative decision, with the reasons for it
    Reject(Option<String>),
}

impl RequestEvent {
    /// Get a string representation of the event type for logging and audit rows
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Approve => "approve",
            Self::Reject(_) => "reject",
        }
    }

    /// Extract the rejection observations if this is a rejection event
    pub fn observations(&self) -> Option<&str> {
        match self {
            Self::Reject(obs) => obs.as_deref(),
            _ => None,
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject(_))
    }

    /// The approval flag this event carries into finalization, if any
    pub fn approval(&self) -> Option<bool> {
        match self {
            Self::Approve => Some(true),
            Self::Reject(_) => Some(false),
            Self::Assign => None,
        }
    }
}

/// Helper for creating common events
impl RequestEvent {
    /// Create a rejection event with the given observations
    pub fn reject_with_observations(observations: impl Into<String>) -> Self {
        Self::Reject(Some(observations.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        assert_eq!(RequestEvent::Assign.event_type(), "assign");
        assert_eq!(RequestEvent::Approve.event_type(), "approve");
        assert_eq!(RequestEvent::Reject(None).event_type(), "reject");
    }

    #[test]
    fn test_terminal_events() {
        assert!(RequestEvent::Approve.is_terminal());
        assert!(RequestEvent::Reject(None).is_terminal());
        assert!(!RequestEvent::Assign.is_terminal());
    }

    #[test]
    fn test_approval_flags() {
        assert_eq!(RequestEvent::Approve.approval(), Some(true));
        assert_eq!(RequestEvent::Reject(None).approval(), Some(false));
        assert_eq!(RequestEvent::Assign.approval(), None);
    }

    #[test]
    fn test_rejection_observations() {
        let event = RequestEvent::reject_with_observations("valve fault not reproducible");
        assert_eq!(event.observations(), Some("valve fault not reproducible"));
        assert_eq!(RequestEvent::Approve.observations(), None);
    }
}

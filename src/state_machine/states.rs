use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of a request or report.
///
/// Ordered progression: `Pending → {Assigned → InProgress} → {Approved | Rejected}
/// → Finalized`, with `Finalized` reachable directly from `Pending` through the
/// administrative approve/reject shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Initial state when the request/report is created
    Pending,
    /// A handler has been assigned but work has not started
    Assigned,
    /// A handler is working the request/report
    InProgress,
    /// Terminal decision: approved
    Approved,
    /// Terminal decision: rejected
    Rejected,
    /// Terminal state; the audit trail is closed
    Finalized,
}

impl RequestStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Finalized)
    }

    /// Check if this is an active state (a handler is working it)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Assigned => write!(f, "assigned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "finalized" => Ok(Self::Finalized),
            _ => Err(format!("Invalid request status: {s}")),
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// States of a maintenance report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    /// The intervention needs further work; the underlying item stays open
    InProgress,
    /// The intervention closes the underlying request/report
    Finalized,
}

impl MaintenanceStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

impl std::str::FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "finalized" => Ok(Self::Finalized),
            _ => Err(format!("Invalid maintenance status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Finalized.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Assigned.is_terminal());
        assert!(!RequestStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_active_states() {
        assert!(RequestStatus::InProgress.is_active());
        assert!(RequestStatus::Assigned.is_active());
        assert!(!RequestStatus::Pending.is_active());
        assert!(!RequestStatus::Finalized.is_active());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(RequestStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            "finalized".parse::<RequestStatus>().unwrap(),
            RequestStatus::Finalized
        );
        assert!("bogus".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let status = RequestStatus::InProgress;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: RequestStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn test_maintenance_status() {
        assert!(MaintenanceStatus::Finalized.is_final());
        assert!(!MaintenanceStatus::InProgress.is_final());
        assert_eq!(
            "finalized".parse::<MaintenanceStatus>().unwrap(),
            MaintenanceStatus::Finalized
        );
    }
}

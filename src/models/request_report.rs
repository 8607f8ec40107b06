use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state_machine::RequestStatus;

/// Prefixed numeric identifier of a request/report, generated at creation.
pub type RequestId = String;
/// Identifier of a user account, resolved by the external auth layer.
pub type UserId = String;
/// Identifier of a lot (sub-parcel).
pub type LotId = String;
/// Identifier of a plot (parcel).
pub type PlotId = String;

/// Cancellation flavor for flow cancellation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelType {
    /// The flow is shut off but the lot stays active
    Temporary,
    /// The flow is shut off and the lot is deactivated
    Definitive,
}

/// Kind discriminant of a request/report with its kind-specific payload.
///
/// The shared validation and lifecycle plumbing keys off this discriminant;
/// everything kind-specific lives in the variant payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestKind {
    /// Request to change the water flow delivered to a lot
    FlowChange {
        /// Requested flow in litres per second, within `[1.0, 11.7)`
        requested_flow: f64,
        /// Set only at finalization, never at creation
        is_approved: bool,
    },
    /// Request to open the flow of a lot whose valve is currently shut
    FlowActivation {
        /// Requested flow in litres per second, within `[1.0, 11.7)`
        requested_flow: f64,
        /// Set only at finalization, never at creation
        is_approved: bool,
    },
    /// Request to cancel the water flow of a lot, temporarily or definitively
    FlowCancel { cancel_type: CancelType },
    /// Report of a water supply fault on a lot or plot
    WaterSupplyFailure,
    /// Report of a fault in the application itself; carries no land reference
    ApplicationFailure,
}

impl RequestKind {
    /// Whether this kind is a flow request (as opposed to a failure report)
    pub fn is_flow_request(&self) -> bool {
        matches!(
            self,
            Self::FlowChange { .. } | Self::FlowActivation { .. } | Self::FlowCancel { .. }
        )
    }

    /// Whether this kind requires a lot reference specifically
    pub fn requires_lot(&self) -> bool {
        self.is_flow_request()
    }

    /// Whether this kind requires a 4" valve on the referenced lot
    pub fn requires_valve(&self) -> bool {
        self.is_flow_request() || matches!(self, Self::WaterSupplyFailure)
    }

    /// Whether this kind must carry no lot/plot reference at all
    pub fn forbids_association(&self) -> bool {
        matches!(self, Self::ApplicationFailure)
    }

    /// Short discriminant name for logging and audit rows
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlowChange { .. } => "flow_change",
            Self::FlowActivation { .. } => "flow_activation",
            Self::FlowCancel { .. } => "flow_cancel",
            Self::WaterSupplyFailure => "water_supply_failure",
            Self::ApplicationFailure => "application_failure",
        }
    }
}

/// A persisted flow request or failure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestReport {
    pub id: RequestId,
    #[serde(flatten)]
    pub kind: RequestKind,
    pub created_by: UserId,
    pub lot: Option<LotId>,
    /// Auto-derived from the lot's parent plot when `lot` is present
    pub plot: Option<PlotId>,
    pub status: RequestStatus,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set once on entering a terminal status, immutable afterwards
    pub finalized_at: Option<DateTime<Utc>>,
}

impl RequestReport {
    /// Whether no further status mutation is permitted
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The approval decision recorded at finalization, if this kind
    /// carries one
    pub fn approval(&self) -> Option<bool> {
        match &self.kind {
            RequestKind::FlowChange { is_approved, .. }
            | RequestKind::FlowActivation { is_approved, .. } => Some(*is_approved),
            _ => None,
        }
    }

    /// The requested flow, if this kind carries one
    pub fn requested_flow(&self) -> Option<f64> {
        match &self.kind {
            RequestKind::FlowChange { requested_flow, .. }
            | RequestKind::FlowActivation { requested_flow, .. } => Some(*requested_flow),
            _ => None,
        }
    }
}

/// Client-supplied fields of a new request/report. Everything else (id,
/// status, creator, derived plot, timestamps) is set by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    #[serde(flatten)]
    pub kind: RequestKind,
    pub lot: Option<LotId>,
    pub plot: Option<PlotId>,
    pub observations: Option<String>,
}

impl RequestDraft {
    pub fn flow_change(lot: impl Into<LotId>, requested_flow: f64) -> Self {
        Self {
            kind: RequestKind::FlowChange {
                requested_flow,
                is_approved: false,
            },
            lot: Some(lot.into()),
            plot: None,
            observations: None,
        }
    }

    pub fn flow_activation(lot: impl Into<LotId>, requested_flow: f64) -> Self {
        Self {
            kind: RequestKind::FlowActivation {
                requested_flow,
                is_approved: false,
            },
            lot: Some(lot.into()),
            plot: None,
            observations: None,
        }
    }

    pub fn flow_cancel(
        lot: impl Into<LotId>,
        cancel_type: CancelType,
        observations: impl Into<String>,
    ) -> Self {
        Self {
            kind: RequestKind::FlowCancel { cancel_type },
            lot: Some(lot.into()),
            plot: None,
            observations: Some(observations.into()),
        }
    }

    pub fn water_supply_failure_on_lot(
        lot: impl Into<LotId>,
        observations: impl Into<String>,
    ) -> Self {
        Self {
            kind: RequestKind::WaterSupplyFailure,
            lot: Some(lot.into()),
            plot: None,
            observations: Some(observations.into()),
        }
    }

    pub fn water_supply_failure_on_plot(
        plot: impl Into<PlotId>,
        observations: impl Into<String>,
    ) -> Self {
        Self {
            kind: RequestKind::WaterSupplyFailure,
            lot: None,
            plot: Some(plot.into()),
            observations: Some(observations.into()),
        }
    }

    pub fn application_failure(observations: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::ApplicationFailure,
            lot: None,
            plot: None,
            observations: Some(observations.into()),
        }
    }
}

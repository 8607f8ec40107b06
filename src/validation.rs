//! # Request/Report Validation
//!
//! Pure predicate logic applied before any state mutation. The checks run in
//! a fixed order and the first failure wins, so a given candidate always
//! produces the same error kind regardless of how many rules it breaks.
//!
//! No side effects; the caller supplies a resource snapshot and the pending
//! situation, which keeps every rule independently unit-testable.

use crate::constants::{
    APP_FAILURE_OBSERVATIONS_MAX, APP_FAILURE_OBSERVATIONS_MIN, FLOW_CANCEL_OBSERVATIONS_MAX,
    FLOW_CANCEL_OBSERVATIONS_MIN, REQUESTED_FLOW_MAX, REQUESTED_FLOW_MIN,
    WATER_FAILURE_OBSERVATIONS_MAX, WATER_FAILURE_OBSERVATIONS_MIN,
};
use crate::models::{CancelType, RequestDraft, RequestKind, UserId};
use crate::resources::{LotSnapshot, PlotSnapshot};
use crate::state_machine::errors::{ValidationError, ValidationResult};

/// Resolved view of the resources a candidate references.
#[derive(Debug, Clone, Default)]
pub struct ResourceSnapshot {
    pub lot: Option<LotSnapshot>,
    pub plot: Option<PlotSnapshot>,
}

impl ResourceSnapshot {
    /// The plot a persisted record would carry: the lot's parent when a lot
    /// is referenced, the plot itself otherwise.
    pub fn effective_plot(&self) -> Option<String> {
        self.lot
            .as_ref()
            .map(|l| l.plot.clone())
            .or_else(|| self.plot.as_ref().map(|p| p.id.clone()))
    }
}

/// Whether non-finalized requests/reports already exist for the candidate's
/// resources. `plot_has_pending` counts every non-finalized item whose plot
/// matches, including lot-level items under that plot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSet {
    pub lot_has_pending: bool,
    pub plot_has_pending: bool,
}

/// Validate a candidate request/report against the invariants.
///
/// Check order (first failure wins):
/// 1. association shape per kind
/// 2. resource is active
/// 3. caller owns the plot
/// 4. 4" valve present where required
/// 5. kind-specific field bounds
/// 6. valve flow state vs the requested operation
/// 7. duplicate-pending uniqueness
pub fn validate(
    draft: &RequestDraft,
    creator: &UserId,
    snapshot: &ResourceSnapshot,
    pending: &PendingSet,
) -> ValidationResult<()> {
    check_association(draft, snapshot)?;
    check_active(draft, snapshot)?;
    check_owner(creator, snapshot)?;
    check_valve(draft, snapshot)?;
    check_fields(draft)?;
    check_flow_state(draft, snapshot)?;
    check_duplicate_pending(draft, pending)?;
    Ok(())
}

/// Association shape per kind: flow requests need a lot, water supply
/// failures need a lot or a plot, application failures carry neither. An
/// unresolvable reference counts as absent.
fn check_association(draft: &RequestDraft, snapshot: &ResourceSnapshot) -> ValidationResult<()> {
    if draft.kind.forbids_association() {
        if draft.lot.is_some() || draft.plot.is_some() {
            return Err(ValidationError::ForbiddenAssociation);
        }
        return Ok(());
    }

    let lot_resolved = draft.lot.is_some() && snapshot.lot.is_some();
    if draft.kind.requires_lot() {
        if !lot_resolved {
            return Err(ValidationError::MissingAssociation);
        }
        return Ok(());
    }

    // WaterSupplyFailure: lot or plot
    let plot_resolved = draft.plot.is_some() && snapshot.plot.is_some();
    if !lot_resolved && !plot_resolved {
        return Err(ValidationError::MissingAssociation);
    }
    Ok(())
}

fn check_active(draft: &RequestDraft, snapshot: &ResourceSnapshot) -> ValidationResult<()> {
    if draft.kind.forbids_association() {
        return Ok(());
    }
    if let Some(lot) = &snapshot.lot {
        if !lot.is_active {
            return Err(ValidationError::InactiveResource);
        }
    } else if let Some(plot) = &snapshot.plot {
        if !plot.is_active {
            return Err(ValidationError::InactiveResource);
        }
    }
    Ok(())
}

fn check_owner(creator: &UserId, snapshot: &ResourceSnapshot) -> ValidationResult<()> {
    let owner = match (&snapshot.lot, &snapshot.plot) {
        (Some(lot), _) => Some(&lot.owner),
        (None, Some(plot)) => Some(&plot.owner),
        (None, None) => None,
    };
    match owner {
        Some(owner) if owner != creator => Err(ValidationError::NotOwner),
        _ => Ok(()),
    }
}

fn check_valve(draft: &RequestDraft, snapshot: &ResourceSnapshot) -> ValidationResult<()> {
    if !draft.kind.requires_valve() {
        return Ok(());
    }
    // Plot-level water supply failures have no lot to carry a valve.
    if let Some(lot) = &snapshot.lot {
        if !lot.has_valve4 {
            return Err(ValidationError::MissingValve);
        }
    }
    Ok(())
}

fn check_fields(draft: &RequestDraft) -> ValidationResult<()> {
    match &draft.kind {
        RequestKind::FlowChange { requested_flow, .. }
        | RequestKind::FlowActivation { requested_flow, .. } => {
            if *requested_flow < REQUESTED_FLOW_MIN || *requested_flow >= REQUESTED_FLOW_MAX {
                return Err(ValidationError::OutOfRange {
                    value: *requested_flow,
                    min: REQUESTED_FLOW_MIN,
                    max: REQUESTED_FLOW_MAX,
                });
            }
            Ok(())
        }
        RequestKind::FlowCancel { .. } => check_observation_length(
            draft.observations.as_deref(),
            FLOW_CANCEL_OBSERVATIONS_MIN,
            FLOW_CANCEL_OBSERVATIONS_MAX,
        ),
        RequestKind::WaterSupplyFailure => check_observation_length(
            draft.observations.as_deref(),
            WATER_FAILURE_OBSERVATIONS_MIN,
            WATER_FAILURE_OBSERVATIONS_MAX,
        ),
        RequestKind::ApplicationFailure => check_observation_length(
            draft.observations.as_deref(),
            APP_FAILURE_OBSERVATIONS_MIN,
            APP_FAILURE_OBSERVATIONS_MAX,
        ),
    }
}

fn check_observation_length(
    observations: Option<&str>,
    min: usize,
    max: usize,
) -> ValidationResult<()> {
    let actual = observations.map_or(0, |o| o.chars().count());
    if actual < min || actual > max {
        return Err(ValidationError::ObservationLengthInvalid { min, max, actual });
    }
    Ok(())
}

/// Valve flow state vs the requested operation. A shut valve (no flow, or a
/// flow of zero) takes an activation but not a change or a temporary
/// cancellation; an open valve takes a change to a *different* flow but not
/// another activation. Definitive cancellations apply regardless.
fn check_flow_state(draft: &RequestDraft, snapshot: &ResourceSnapshot) -> ValidationResult<()> {
    let Some(lot) = &snapshot.lot else {
        return Ok(());
    };
    let actual_flow = lot.actual_flow.unwrap_or(0.0);
    let flow_active = actual_flow > 0.0;

    match &draft.kind {
        RequestKind::FlowChange { requested_flow, .. } => {
            if !flow_active {
                return Err(ValidationError::FlowInactive);
            }
            if *requested_flow == actual_flow {
                return Err(ValidationError::FlowUnchanged {
                    value: *requested_flow,
                });
            }
        }
        RequestKind::FlowActivation { .. } => {
            if flow_active {
                return Err(ValidationError::FlowAlreadyActive);
            }
        }
        RequestKind::FlowCancel { cancel_type } => {
            if *cancel_type == CancelType::Temporary && !flow_active {
                return Err(ValidationError::FlowAlreadyInactive);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Uniqueness (one non-finalized item per resource), with the carried-over
/// asymmetry: a lot-level pending item blocks both lot- and plot-level
/// creation on its plot, while a plot-level pending item blocks only
/// plot-level creation. Pending product clarification; do not "fix" silently.
fn check_duplicate_pending(draft: &RequestDraft, pending: &PendingSet) -> ValidationResult<()> {
    if draft.kind.forbids_association() {
        return Ok(());
    }
    if blocked_by_pending(draft.lot.is_some(), pending) {
        return Err(ValidationError::DuplicatePending);
    }
    Ok(())
}

/// Single home of the asymmetric uniqueness rule, shared with the storage
/// layer's atomic re-check at insert time.
pub fn blocked_by_pending(has_lot_ref: bool, pending: &PendingSet) -> bool {
    if has_lot_ref {
        pending.lot_has_pending
    } else {
        pending.plot_has_pending
    }
}

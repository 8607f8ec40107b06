use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentId, AssignmentTarget, MaintenanceReport, MaintenanceReportId,
    MaintenanceSubmission, RequestId, RequestKind, RequestReport, StatusTransition, UserId,
};
use crate::state_machine::{
    errors::{AssignError, ResolveError, StateError},
    plan_transition, RequestEvent, RequestStatus, TransitionDenial,
};
use crate::validation::{blocked_by_pending, PendingSet};

/// Event name recorded on the creation transition row.
const CREATE_EVENT: &str = "create";

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<RequestId, RequestReport>,
    transitions: Vec<StatusTransition>,
    assignments: HashMap<AssignmentId, Assignment>,
    maintenance: HashMap<MaintenanceReportId, MaintenanceReport>,
}

/// In-memory store. A single writer lock over the whole dataset keeps the
/// check-then-insert and compare-and-set regions serializable; every
/// operation here is short and allocation-light, so the lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finalized situation for the given resource references.
    /// `plot_has_pending` counts lot-level items under the plot as well.
    pub fn pending_set(&self, lot: Option<&str>, plot: Option<&str>) -> PendingSet {
        let inner = self.inner.read();
        Self::pending_set_locked(&inner, lot, plot)
    }

    fn pending_set_locked(inner: &Inner, lot: Option<&str>, plot: Option<&str>) -> PendingSet {
        let mut pending = PendingSet::default();
        for record in inner.requests.values() {
            if record.is_terminal() {
                continue;
            }
            if let (Some(lot), Some(record_lot)) = (lot, record.lot.as_deref()) {
                if lot == record_lot {
                    pending.lot_has_pending = true;
                }
            }
            if let (Some(plot), Some(record_plot)) = (plot, record.plot.as_deref()) {
                if plot == record_plot {
                    pending.plot_has_pending = true;
                }
            }
        }
        pending
    }

    /// Insert a new pending request/report.
    ///
    /// Generates a collision-free id and re-checks the duplicate-pending rule
    /// inside the write lock: between the caller's validation pass and this
    /// insert another creation may have committed, and the loser of that race
    /// must observe the conflict rather than silently duplicating.
    pub fn insert_pending(
        &self,
        mut record: RequestReport,
        prefix: &str,
    ) -> Result<RequestReport, crate::state_machine::ValidationError> {
        let mut inner = self.inner.write();

        if record.lot.is_some() || record.plot.is_some() {
            let pending =
                Self::pending_set_locked(&inner, record.lot.as_deref(), record.plot.as_deref());
            if blocked_by_pending(record.lot.is_some(), &pending) {
                return Err(crate::state_machine::ValidationError::DuplicatePending);
            }
        }

        record.id = Self::generate_id(prefix, |id| inner.requests.contains_key(id));
        record.status = RequestStatus::Pending;
        record.finalized_at = None;

        Self::push_transition_locked(
            &mut inner,
            record.id.clone(),
            None,
            RequestStatus::Pending,
            CREATE_EVENT,
            record.created_by.clone(),
        );
        inner.requests.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    pub fn get_request(&self, id: &str) -> Option<RequestReport> {
        self.inner.read().requests.get(id).cloned()
    }

    /// Apply a lifecycle event to a stored request/report.
    ///
    /// The read of the current status and the write of the new one happen
    /// under one write lock (compare-and-set): a concurrent finalizer that
    /// lost the race gets `AlreadyFinalized`, never a lost update.
    pub fn apply_transition(
        &self,
        id: &str,
        event: &RequestEvent,
        actor: &UserId,
    ) -> Result<RequestReport, StateError> {
        let mut inner = self.inner.write();
        Self::apply_transition_locked(&mut inner, id, event, actor)
    }

    /// Compare-and-set body of [`Self::apply_transition`]; also runs inside
    /// the assignment and maintenance critical sections so that their row
    /// inserts commit in the same region as the status change.
    fn apply_transition_locked(
        inner: &mut Inner,
        id: &str,
        event: &RequestEvent,
        actor: &UserId,
    ) -> Result<RequestReport, StateError> {
        let current = match inner.requests.get(id) {
            Some(record) => record.status,
            None => return Err(StateError::NotFound(id.to_string())),
        };

        let plan = plan_transition(current, event).map_err(|denial| match denial {
            TransitionDenial::AlreadyFinalized => StateError::AlreadyFinalized(id.to_string()),
            TransitionDenial::Invalid => StateError::InvalidTransition {
                from: current.to_string(),
                event: event.event_type().to_string(),
            },
        })?;

        // Collapsed intermediate states surface in the audit trail only.
        let mut from = current;
        if let Some(via) = plan.via {
            Self::push_transition_locked(
                inner,
                id.to_string(),
                Some(from),
                via,
                event.event_type(),
                actor.clone(),
            );
            from = via;
        }
        if from != plan.to {
            Self::push_transition_locked(
                inner,
                id.to_string(),
                Some(from),
                plan.to,
                event.event_type(),
                actor.clone(),
            );
        }

        let record = inner
            .requests
            .get_mut(id)
            .expect("request checked above while holding the write lock");
        record.status = plan.to;
        if plan.to.is_terminal() {
            record.finalized_at = Some(Utc::now());
            if let Some(obs) = event.observations() {
                record.observations = Some(obs.to_string());
            }
            if let Some(approved) = event.approval() {
                if let RequestKind::FlowChange { is_approved, .. }
                | RequestKind::FlowActivation { is_approved, .. } = &mut record.kind
                {
                    *is_approved = approved;
                }
            }
        }
        Ok(record.clone())
    }

    /// Audit trail of a request/report, in application order.
    pub fn transitions_for(&self, id: &str) -> Vec<StatusTransition> {
        self.inner
            .read()
            .transitions
            .iter()
            .filter(|t| t.request_id == id)
            .cloned()
            .collect()
    }

    /// Create an assignment for the target and move the target in progress.
    ///
    /// The duplicate check, the status transition and the row insert share
    /// one critical section: when a concurrent finalizer wins the transition,
    /// no assignment row is left behind.
    pub fn insert_assignment(
        &self,
        target: AssignmentTarget,
        assigned_by: UserId,
        assigned_to: UserId,
    ) -> Result<Assignment, AssignError> {
        let mut inner = self.inner.write();

        let mut superseding = false;
        for prior in inner.assignments.values() {
            if prior.target.request_id() != target.request_id() {
                continue;
            }
            let resolved = inner
                .maintenance
                .values()
                .any(|report| report.assignment == prior.id);
            if prior.assigned_to == assigned_to && !resolved {
                return Err(AssignError::DuplicateAssignment);
            }
            if !resolved {
                superseding = true;
            }
        }

        // The transition fails without mutating anything, so a denial here
        // leaves neither rows nor status behind.
        Self::apply_transition_locked(
            &mut inner,
            target.request_id(),
            &RequestEvent::Assign,
            &assigned_by,
        )?;

        let assignment = Assignment {
            id: Self::generate_id(crate::constants::id_prefixes::ASSIGNMENT, |id| {
                inner.assignments.contains_key(id)
            }),
            target,
            assigned_by,
            assigned_to,
            assignment_date: Utc::now(),
            reassigned: superseding,
        };
        inner
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(assignment)
    }

    pub fn get_assignment(&self, id: &str) -> Option<Assignment> {
        self.inner.read().assignments.get(id).cloned()
    }

    /// Persist a maintenance report; one report resolves one assignment.
    ///
    /// The duplicate check, the terminal re-check of the underlying request
    /// and the finalizing transition (for a final report) run in one critical
    /// section, so a concurrent finalizer can never strand a report row next
    /// to an `AlreadyFinalized` denial. Returns the updated request record
    /// when the report finalized it.
    pub fn insert_maintenance(
        &self,
        submission: &MaintenanceSubmission,
        request_id: &str,
        finalizing: Option<(&RequestEvent, &UserId)>,
    ) -> Result<(MaintenanceReport, Option<RequestReport>), ResolveError> {
        let mut inner = self.inner.write();

        if inner
            .maintenance
            .values()
            .any(|report| report.assignment == submission.assignment)
        {
            return Err(ResolveError::AlreadyResolved);
        }
        match inner.requests.get(request_id) {
            None => return Err(StateError::NotFound(request_id.to_string()).into()),
            Some(record) if record.is_terminal() => {
                return Err(StateError::AlreadyFinalized(record.id.clone()).into());
            }
            Some(_) => {}
        }

        let finalized = match finalizing {
            Some((event, actor)) => Some(Self::apply_transition_locked(
                &mut inner, request_id, event, actor,
            )?),
            None => None,
        };

        let report = MaintenanceReport {
            id: Self::generate_id(crate::constants::id_prefixes::MAINTENANCE_REPORT, |id| {
                inner.maintenance.contains_key(id)
            }),
            assignment: submission.assignment.clone(),
            intervention_date: submission.intervention_date,
            status: submission.status,
            observations: submission.observations.clone(),
            maintenance_type: submission.maintenance_type.clone(),
            is_approved: submission.is_approved,
            images: submission.images.clone(),
            created_at: Utc::now(),
        };
        inner.maintenance.insert(report.id.clone(), report.clone());
        Ok((report, finalized))
    }

    pub fn get_maintenance(&self, id: &str) -> Option<MaintenanceReport> {
        self.inner.read().maintenance.get(id).cloned()
    }

    /// Prefixed numeric id: `<prefix>` plus six digits derived from a fresh
    /// UUID, regenerated until it collides with nothing.
    fn generate_id(prefix: &str, exists: impl Fn(&str) -> bool) -> String {
        loop {
            let digits = Uuid::new_v4().as_u128() % 1_000_000;
            let candidate = format!("{prefix}{digits:06}");
            if !exists(&candidate) {
                return candidate;
            }
        }
    }

    fn push_transition_locked(
        inner: &mut Inner,
        request_id: RequestId,
        from: Option<RequestStatus>,
        to: RequestStatus,
        event: &str,
        actor: UserId,
    ) {
        let sort_key = inner
            .transitions
            .iter()
            .filter(|t| t.request_id == request_id)
            .count() as i32
            + 1;
        for prior in inner
            .transitions
            .iter_mut()
            .filter(|t| t.request_id == request_id)
        {
            prior.most_recent = false;
        }
        inner
            .transitions
            .push(StatusTransition::new(request_id, from, to, event, actor, sort_key));
    }
}

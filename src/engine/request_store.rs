use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::constants::id_prefixes;
use crate::error::{CreateError, TransitionError};
use crate::events::{LifecycleEvent, LifecycleEventKind, NotificationDispatcher};
use crate::models::{CancelType, RequestDraft, RequestKind, RequestReport, UserId};
use crate::resources::{ResourceError, ResourceLookup};
use crate::state_machine::RequestEvent;
use crate::store::InMemoryStore;
use crate::validation::{self, ResourceSnapshot};

/// Creation and status transitions of requests/reports.
///
/// Owns the full creation pipeline (resource snapshot, validation, atomic
/// insert, event emission) and the transition pipeline (compare-and-set
/// update, valve write-back on approved flow decisions, event emission).
pub struct RequestReportStore {
    store: Arc<InMemoryStore>,
    resources: Arc<dyn ResourceLookup>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl RequestReportStore {
    pub fn new(
        store: Arc<InMemoryStore>,
        resources: Arc<dyn ResourceLookup>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            resources,
            dispatcher,
        }
    }

    /// Create a new request/report on behalf of `creator`.
    ///
    /// Validation runs against a point-in-time resource snapshot; the
    /// duplicate-pending rule is re-checked atomically at insert, so the
    /// loser of a concurrent creation race still observes `DuplicatePending`.
    pub async fn create(
        &self,
        draft: RequestDraft,
        creator: &UserId,
    ) -> Result<RequestReport, CreateError> {
        let snapshot = self.snapshot_resources(&draft).await?;
        let effective_plot = snapshot.effective_plot();
        let pending = self
            .store
            .pending_set(draft.lot.as_deref(), effective_plot.as_deref());

        validation::validate(&draft, creator, &snapshot, &pending)?;

        let prefix = if draft.kind.is_flow_request() {
            id_prefixes::FLOW_REQUEST
        } else {
            id_prefixes::FAILURE_REPORT
        };
        let record = self.store.insert_pending(
            RequestReport {
                id: String::new(),
                kind: draft.kind,
                created_by: creator.clone(),
                lot: draft.lot,
                plot: effective_plot,
                status: Default::default(),
                observations: draft.observations,
                created_at: Utc::now(),
                finalized_at: None,
            },
            prefix,
        )?;

        info!(
            request_id = %record.id,
            kind = record.kind.name(),
            created_by = %creator,
            "request created"
        );
        self.emit(LifecycleEvent::new(
            LifecycleEventKind::Created,
            record.id.clone(),
            vec![creator.clone()],
            json!({
                "kind": record.kind.name(),
                "lot": record.lot,
                "plot": record.plot,
            }),
        ))
        .await;

        Ok(record)
    }

    /// Apply a lifecycle event to a stored request/report.
    ///
    /// An approve event on a flow request also writes the decision through to
    /// the valve device: the requested flow for a change or an activation,
    /// zero for a cancellation (plus lot deactivation when the cancellation
    /// is definitive).
    pub async fn transition_status(
        &self,
        id: &str,
        event: RequestEvent,
        actor: &UserId,
    ) -> Result<RequestReport, TransitionError> {
        let record = self.store.apply_transition(id, &event, actor)?;
        self.post_transition(&record, &event, actor).await?;
        Ok(record)
    }

    /// Write-backs and notifications following a committed transition. The
    /// maintenance resolution path commits its transition inside the store's
    /// critical section and calls this afterwards.
    pub(crate) async fn post_transition(
        &self,
        record: &RequestReport,
        event: &RequestEvent,
        actor: &UserId,
    ) -> Result<(), TransitionError> {
        if record.is_terminal() && event.approval() == Some(true) {
            self.apply_flow_decision(record).await?;
        }

        info!(
            request_id = %record.id,
            status = %record.status,
            event = event.event_type(),
            actor = %actor,
            "status changed"
        );
        self.emit(LifecycleEvent::new(
            LifecycleEventKind::StatusChanged,
            record.id.clone(),
            vec![record.created_by.clone()],
            json!({
                "status": record.status.to_string(),
                "event": event.event_type(),
            }),
        ))
        .await;

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<RequestReport> {
        self.store.get_request(id)
    }

    /// Audit trail of a request/report, in application order.
    pub fn audit_trail(&self, id: &str) -> Vec<crate::models::StatusTransition> {
        self.store.transitions_for(id)
    }

    async fn snapshot_resources(
        &self,
        draft: &RequestDraft,
    ) -> Result<ResourceSnapshot, ResourceError> {
        let mut snapshot = ResourceSnapshot::default();
        if let Some(lot) = &draft.lot {
            snapshot.lot = self.resources.get_lot(lot).await?;
        }
        if snapshot.lot.is_none() {
            if let Some(plot) = &draft.plot {
                snapshot.plot = self.resources.get_plot(plot).await?;
            }
        }
        Ok(snapshot)
    }

    async fn apply_flow_decision(&self, record: &RequestReport) -> Result<(), ResourceError> {
        let Some(lot) = &record.lot else {
            return Ok(());
        };
        match &record.kind {
            RequestKind::FlowChange { requested_flow, .. }
            | RequestKind::FlowActivation { requested_flow, .. } => {
                self.resources.set_actual_flow(lot, *requested_flow).await?;
                info!(lot = %lot, flow = requested_flow, "valve flow updated");
            }
            RequestKind::FlowCancel { cancel_type } => {
                self.resources.set_actual_flow(lot, 0.0).await?;
                if *cancel_type == CancelType::Definitive {
                    self.resources.set_lot_active(lot, false).await?;
                }
                info!(lot = %lot, cancel_type = ?cancel_type, "valve flow cancelled");
            }
            _ => {}
        }
        Ok(())
    }

    async fn emit(&self, event: LifecycleEvent) {
        if let Err(err) = self.dispatcher.dispatch(event).await {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventPublisher;
    use crate::resources::{InMemoryResources, LotSnapshot};
    use crate::state_machine::{RequestStatus, StateError, ValidationError};

    fn fixture() -> (RequestReportStore, Arc<InMemoryResources>, EventPublisher) {
        let resources = Arc::new(InMemoryResources::new());
        resources.insert_lot(LotSnapshot {
            id: "lot-1".into(),
            plot: "plot-1".into(),
            owner: "farmer-1".into(),
            is_active: true,
            has_valve4: true,
            actual_flow: Some(4.2),
        });
        let publisher = EventPublisher::default();
        let engine = RequestReportStore::new(
            Arc::new(InMemoryStore::new()),
            resources.clone(),
            Arc::new(publisher.clone()),
        );
        (engine, resources, publisher)
    }

    #[tokio::test]
    async fn test_create_derives_plot_and_emits() {
        let (engine, _, publisher) = fixture();
        let mut rx = publisher.subscribe();

        let record = engine
            .create(RequestDraft::flow_change("lot-1", 10.5), &"farmer-1".into())
            .await
            .unwrap();

        assert!(record.id.starts_with("10"));
        assert_eq!(record.plot.as_deref(), Some("plot-1"));
        assert_eq!(record.status, RequestStatus::Pending);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, LifecycleEventKind::Created);
        assert_eq!(event.request_id, record.id);
        assert_eq!(event.recipients, vec!["farmer-1".to_string()]);
    }

    #[tokio::test]
    async fn test_create_rejects_non_owner() {
        let (engine, _, _) = fixture();
        let err = engine
            .create(RequestDraft::flow_change("lot-1", 10.5), &"farmer-2".into())
            .await
            .unwrap_err();
        assert_eq!(err, CreateError::Validation(ValidationError::NotOwner));
    }

    #[tokio::test]
    async fn test_approved_flow_change_writes_to_valve() {
        let (engine, resources, _) = fixture();
        let record = engine
            .create(RequestDraft::flow_change("lot-1", 10.5), &"farmer-1".into())
            .await
            .unwrap();

        let updated = engine
            .transition_status(&record.id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Finalized);
        assert_eq!(updated.approval(), Some(true));
        assert_eq!(resources.actual_flow(&"lot-1".into()), Some(10.5));
    }

    #[tokio::test]
    async fn test_flow_change_matching_valve_flow_rejected() {
        let (engine, _, _) = fixture();
        let err = engine
            .create(RequestDraft::flow_change("lot-1", 4.2), &"farmer-1".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CreateError::Validation(ValidationError::FlowUnchanged { value: 4.2 })
        );
    }

    #[tokio::test]
    async fn test_approved_activation_opens_valve() {
        let (engine, resources, _) = fixture();
        resources.insert_lot(LotSnapshot {
            id: "lot-2".into(),
            plot: "plot-2".into(),
            owner: "farmer-1".into(),
            is_active: true,
            has_valve4: true,
            actual_flow: None,
        });

        // A change on the shut valve points the farmer at activation instead
        let err = engine
            .create(RequestDraft::flow_change("lot-2", 5.0), &"farmer-1".into())
            .await
            .unwrap_err();
        assert_eq!(err, CreateError::Validation(ValidationError::FlowInactive));

        let record = engine
            .create(RequestDraft::flow_activation("lot-2", 5.0), &"farmer-1".into())
            .await
            .unwrap();
        assert!(record.id.starts_with("10"));

        let updated = engine
            .transition_status(&record.id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();
        assert_eq!(updated.approval(), Some(true));
        assert_eq!(resources.actual_flow(&"lot-2".into()), Some(5.0));
    }

    #[tokio::test]
    async fn test_activation_rejected_on_open_valve() {
        let (engine, _, _) = fixture();
        let err = engine
            .create(RequestDraft::flow_activation("lot-1", 5.0), &"farmer-1".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CreateError::Validation(ValidationError::FlowAlreadyActive)
        );
    }

    #[tokio::test]
    async fn test_rejected_flow_change_leaves_valve_alone() {
        let (engine, resources, _) = fixture();
        let record = engine
            .create(RequestDraft::flow_change("lot-1", 10.5), &"farmer-1".into())
            .await
            .unwrap();

        let updated = engine
            .transition_status(
                &record.id,
                RequestEvent::Reject(Some("insufficient canal pressure".into())),
                &"admin-1".into(),
            )
            .await
            .unwrap();

        assert_eq!(updated.approval(), Some(false));
        assert_eq!(
            updated.observations.as_deref(),
            Some("insufficient canal pressure")
        );
        assert_eq!(resources.actual_flow(&"lot-1".into()), Some(4.2));
    }

    #[tokio::test]
    async fn test_approved_definitive_cancel_deactivates_lot() {
        let (engine, resources, _) = fixture();
        let record = engine
            .create(
                RequestDraft::flow_cancel("lot-1", CancelType::Definitive, "season is over"),
                &"farmer-1".into(),
            )
            .await
            .unwrap();

        engine
            .transition_status(&record.id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();

        assert_eq!(resources.actual_flow(&"lot-1".into()), Some(0.0));
        assert_eq!(resources.lot_is_active(&"lot-1".into()), Some(false));
    }

    #[tokio::test]
    async fn test_second_finalizer_rejected() {
        let (engine, _, _) = fixture();
        let record = engine
            .create(RequestDraft::flow_change("lot-1", 10.5), &"farmer-1".into())
            .await
            .unwrap();

        engine
            .transition_status(&record.id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();
        let err = engine
            .transition_status(&record.id, RequestEvent::Reject(None), &"admin-2".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::State(StateError::AlreadyFinalized(record.id))
        );
    }

    #[tokio::test]
    async fn test_creation_unblocked_after_finalization() {
        let (engine, _, _) = fixture();
        let creator: UserId = "farmer-1".into();

        let first = engine
            .create(RequestDraft::flow_change("lot-1", 5.0), &creator)
            .await
            .unwrap();
        let blocked = engine
            .create(RequestDraft::flow_change("lot-1", 6.0), &creator)
            .await
            .unwrap_err();
        assert_eq!(
            blocked,
            CreateError::Validation(ValidationError::DuplicatePending)
        );

        engine
            .transition_status(&first.id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();
        assert!(engine
            .create(RequestDraft::flow_change("lot-1", 6.0), &creator)
            .await
            .is_ok());
    }
}

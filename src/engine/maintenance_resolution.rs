use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::events::{LifecycleEvent, LifecycleEventKind, NotificationDispatcher};
use crate::models::{MaintenanceReport, MaintenanceSubmission, UserId};
use crate::state_machine::{
    errors::{ResolveError, StateError},
    RequestEvent,
};
use crate::store::InMemoryStore;

use super::request_store::RequestReportStore;

/// Resolution of assignments through maintenance reports.
///
/// Only the assigned handler may file the report, exactly one report
/// resolves one assignment, and a `Finalized` report drives the underlying
/// request/report to its terminal state (through the transition pipeline, so
/// an approved flow decision still reaches the valve).
pub struct MaintenanceResolutionEngine {
    store: Arc<InMemoryStore>,
    requests: Arc<RequestReportStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl MaintenanceResolutionEngine {
    pub fn new(
        store: Arc<InMemoryStore>,
        requests: Arc<RequestReportStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            requests,
            dispatcher,
        }
    }

    pub async fn resolve(
        &self,
        submission: MaintenanceSubmission,
        actor: &UserId,
    ) -> Result<MaintenanceReport, ResolveError> {
        let assignment = self
            .store
            .get_assignment(&submission.assignment)
            .ok_or_else(|| ResolveError::AssignmentNotFound(submission.assignment.clone()))?;
        if &assignment.assigned_to != actor {
            return Err(ResolveError::Unauthorized);
        }

        let request = self
            .store
            .get_request(assignment.target.request_id())
            .ok_or_else(|| StateError::NotFound(assignment.target.request_id().clone()))?;

        if submission.intervention_date > Utc::now() {
            return Err(ResolveError::InvalidReport(
                "intervention date cannot lie in the future".into(),
            ));
        }
        if !submission.has_evidence() {
            return Err(ResolveError::InvalidReport(
                "at least one of observations or images is required".into(),
            ));
        }

        // A final report commits together with the finalizing transition in
        // one store critical section; the terminal re-check lives there too,
        // so a racing finalizer leaves no report row behind.
        let finalizing = submission.status.is_final().then(|| {
            if submission.is_approved {
                RequestEvent::Approve
            } else {
                RequestEvent::Reject(submission.observations.clone())
            }
        });
        let (report, finalized) = self.store.insert_maintenance(
            &submission,
            &request.id,
            finalizing.as_ref().map(|event| (event, actor)),
        )?;
        if let (Some(record), Some(event)) = (&finalized, &finalizing) {
            self.requests.post_transition(record, event, actor).await?;
        }

        info!(
            report_id = %report.id,
            assignment_id = %assignment.id,
            request_id = %request.id,
            status = %report.status,
            "maintenance report filed"
        );
        self.emit(LifecycleEvent::new(
            LifecycleEventKind::Resolved,
            request.id.clone(),
            vec![request.created_by.clone(), assignment.assigned_by.clone()],
            json!({
                "report_id": report.id,
                "maintenance_status": report.status.to_string(),
                "is_approved": report.is_approved,
            }),
        ))
        .await;

        Ok(report)
    }

    pub fn get(&self, id: &str) -> Option<MaintenanceReport> {
        self.store.get_maintenance(id)
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
    use crate::constants::capabilities;
    use crate::engine::AssignmentCoordinator;
    use crate::events::EventPublisher;
    use crate::models::{AssignmentTarget, RequestDraft};
    use crate::resources::{InMemoryResources, LotSnapshot};
    use crate::state_machine::{MaintenanceStatus, RequestStatus};
    use chrono::Duration;

    struct Fixture {
        requests: Arc<RequestReportStore>,
        coordinator: AssignmentCoordinator,
        engine: MaintenanceResolutionEngine,
        publisher: EventPublisher,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let resources = Arc::new(InMemoryResources::new());
        resources.insert_lot(LotSnapshot {
            id: "lot-1".into(),
            plot: "plot-1".into(),
            owner: "farmer-1".into(),
            is_active: true,
            has_valve4: true,
            actual_flow: Some(4.2),
        });
        resources.grant("mgr-1", capabilities::CAN_ASSIGN);
        resources.grant("tech-1", capabilities::CAN_BE_ASSIGNED);
        let publisher = EventPublisher::default();
        let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(publisher.clone());

        let requests = Arc::new(RequestReportStore::new(
            store.clone(),
            resources.clone(),
            dispatcher.clone(),
        ));
        let coordinator =
            AssignmentCoordinator::new(store.clone(), resources.clone(), dispatcher.clone());
        let engine =
            MaintenanceResolutionEngine::new(store, requests.clone(), dispatcher);
        Fixture {
            requests,
            coordinator,
            engine,
            publisher,
        }
    }

    async fn assigned_failure_report(fx: &Fixture) -> (String, String) {
        let record = fx
            .requests
            .create(
                RequestDraft::water_supply_failure_on_lot("lot-1", "no water since monday"),
                &"farmer-1".into(),
            )
            .await
            .unwrap();
        let assignment = fx
            .coordinator
            .assign(
                AssignmentTarget::FailureReport(record.id.clone()),
                &"mgr-1".into(),
                &"tech-1".into(),
            )
            .await
            .unwrap();
        (record.id, assignment.id)
    }

    fn submission(assignment: &str) -> MaintenanceSubmission {
        MaintenanceSubmission {
            assignment: assignment.into(),
            intervention_date: Utc::now() - Duration::hours(2),
            status: MaintenanceStatus::Finalized,
            observations: Some("cleared debris from intake".into()),
            maintenance_type: "corrective".into(),
            is_approved: true,
            images: None,
        }
    }

    #[tokio::test]
    async fn test_finalized_report_finalizes_request() {
        let fx = fixture();
        let (request_id, assignment_id) = assigned_failure_report(&fx).await;
        let mut rx = fx.publisher.subscribe();

        let report = fx
            .engine
            .resolve(submission(&assignment_id), &"tech-1".into())
            .await
            .unwrap();

        assert!(report.id.starts_with("40"));
        let request = fx.requests.get(&request_id).unwrap();
        assert_eq!(request.status, RequestStatus::Finalized);
        assert!(request.finalized_at.is_some());

        // StatusChanged from the finalization, then Resolved
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, LifecycleEventKind::StatusChanged);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, LifecycleEventKind::Resolved);
        assert_eq!(
            second.recipients,
            vec!["farmer-1".to_string(), "mgr-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_in_progress_report_leaves_request_open() {
        let fx = fixture();
        let (request_id, assignment_id) = assigned_failure_report(&fx).await;

        let mut sub = submission(&assignment_id);
        sub.status = MaintenanceStatus::InProgress;
        fx.engine.resolve(sub, &"tech-1".into()).await.unwrap();

        assert_eq!(
            fx.requests.get(&request_id).unwrap().status,
            RequestStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_only_assigned_handler_may_file() {
        let fx = fixture();
        let (_, assignment_id) = assigned_failure_report(&fx).await;

        let err = fx
            .engine
            .resolve(submission(&assignment_id), &"tech-2".into())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::Unauthorized);
    }

    #[tokio::test]
    async fn test_future_intervention_date_rejected() {
        let fx = fixture();
        let (_, assignment_id) = assigned_failure_report(&fx).await;

        let mut sub = submission(&assignment_id);
        sub.intervention_date = Utc::now() + Duration::days(1);
        let err = fx.engine.resolve(sub, &"tech-1".into()).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidReport(_)));
    }

    #[tokio::test]
    async fn test_evidence_required() {
        let fx = fixture();
        let (_, assignment_id) = assigned_failure_report(&fx).await;

        let mut sub = submission(&assignment_id);
        sub.observations = None;
        sub.images = None;
        let err = fx.engine.resolve(sub, &"tech-1".into()).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidReport(_)));
    }

    #[tokio::test]
    async fn test_finalized_request_leaves_no_report_row() {
        let fx = fixture();
        let (request_id, assignment_id) = assigned_failure_report(&fx).await;
        fx.requests
            .transition_status(&request_id, RequestEvent::Approve, &"admin-1".into())
            .await
            .unwrap();

        let err = fx
            .engine
            .resolve(submission(&assignment_id), &"tech-1".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::State(StateError::AlreadyFinalized(request_id.clone()))
        );

        // A stranded report row would turn the retry into AlreadyResolved
        let err = fx
            .engine
            .resolve(submission(&assignment_id), &"tech-1".into())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::State(StateError::AlreadyFinalized(request_id))
        );
    }

    #[tokio::test]
    async fn test_second_report_rejected() {
        let fx = fixture();
        let (_, assignment_id) = assigned_failure_report(&fx).await;

        let mut first = submission(&assignment_id);
        first.status = MaintenanceStatus::InProgress;
        fx.engine.resolve(first, &"tech-1".into()).await.unwrap();

        let err = fx
            .engine
            .resolve(submission(&assignment_id), &"tech-1".into())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::AlreadyResolved);
    }

    #[tokio::test]
    async fn test_unknown_assignment() {
        let fx = fixture();
        let err = fx
            .engine
            .resolve(submission("30999999"), &"tech-1".into())
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::AssignmentNotFound("30999999".into()));
    }
}

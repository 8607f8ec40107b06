use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::constants::capabilities;
use crate::events::{LifecycleEvent, LifecycleEventKind, NotificationDispatcher};
use crate::models::{Assignment, AssignmentTarget, UserId};
use crate::resources::Authz;
use crate::state_machine::errors::{AssignError, AuthzError, StateError};
use crate::store::InMemoryStore;

/// Delegation of requests/reports to handlers.
///
/// Enforces the capability pair (`can_assign` for the assigner,
/// `can_be_assigned` for the handler), forbids self-assignment, and moves the
/// target to `InProgress`. Reassignment appends a new record flagged
/// `reassigned`; history is never deleted.
pub struct AssignmentCoordinator {
    store: Arc<InMemoryStore>,
    authz: Arc<dyn Authz>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AssignmentCoordinator {
    pub fn new(
        store: Arc<InMemoryStore>,
        authz: Arc<dyn Authz>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            authz,
            dispatcher,
        }
    }

    pub async fn assign(
        &self,
        target: AssignmentTarget,
        assigned_by: &UserId,
        assigned_to: &UserId,
    ) -> Result<Assignment, AssignError> {
        self.require_capability(assigned_by, capabilities::CAN_ASSIGN)
            .await?;
        self.require_capability(assigned_to, capabilities::CAN_BE_ASSIGNED)
            .await?;
        if assigned_by == assigned_to {
            return Err(AssignError::SelfAssignment);
        }

        let request = self
            .store
            .get_request(target.request_id())
            .ok_or_else(|| StateError::NotFound(target.request_id().clone()))?;
        // The target flavor must match the stored kind; a flow-request id
        // used as a failure-report reference resolves to nothing.
        let flavor_matches = match &target {
            AssignmentTarget::FlowRequest(_) => request.kind.is_flow_request(),
            AssignmentTarget::FailureReport(_) => !request.kind.is_flow_request(),
        };
        if !flavor_matches {
            return Err(StateError::NotFound(target.request_id().clone()).into());
        }

        // Row insert and the move to InProgress commit in one store critical
        // section; a finalized target yields AlreadyFinalized with no row.
        let assignment =
            self.store
                .insert_assignment(target, assigned_by.clone(), assigned_to.clone())?;

        info!(
            assignment_id = %assignment.id,
            request_id = %request.id,
            assigned_to = %assigned_to,
            reassigned = assignment.reassigned,
            "request assigned"
        );
        self.emit(LifecycleEvent::new(
            LifecycleEventKind::Assigned,
            request.id.clone(),
            vec![assigned_by.clone(), assigned_to.clone()],
            json!({
                "assignment_id": assignment.id,
                "reassigned": assignment.reassigned,
            }),
        ))
        .await;

        Ok(assignment)
    }

    pub fn get(&self, id: &str) -> Option<Assignment> {
        self.store.get_assignment(id)
    }

    async fn require_capability(
        &self,
        user: &UserId,
        capability: &str,
    ) -> Result<(), AuthzError> {
        if self.authz.has_capability(user, capability).await {
            Ok(())
        } else {
            Err(AuthzError::Unauthorized {
                user: user.clone(),
                capability: capability.to_string(),
            })
        }
    }

    async fn emit(&self, event: LifecycleEvent) {
        if let Err(err) = self.dispatcher.dispatch(event).await {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}

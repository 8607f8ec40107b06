use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::constants::{events, EVENT_CHANNEL_CAPACITY};
use crate::models::{RequestId, UserId};

/// What happened to a request or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    Created,
    StatusChanged,
    Assigned,
    Resolved,
}

impl LifecycleEventKind {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Created => events::REQUEST_CREATED,
            Self::StatusChanged => events::REQUEST_STATUS_CHANGED,
            Self::Assigned => events::REQUEST_ASSIGNED,
            Self::Resolved => events::REQUEST_RESOLVED,
        }
    }
}

/// One lifecycle event, carrying the parties to notify and a JSON payload
/// with the details the dispatcher needs to phrase the notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: LifecycleEventKind,
    pub request_id: RequestId,
    /// Users who should be notified of this event
    pub recipients: Vec<UserId>,
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(
        kind: LifecycleEventKind,
        request_id: impl Into<RequestId>,
        recipients: Vec<UserId>,
        payload: Value,
    ) -> Self {
        Self {
            kind,
            request_id: request_id.into(),
            recipients,
            payload,
            occurred_at: Utc::now(),
        }
    }
}

/// Delivery side of the notification contract. The engine raises events
/// through this trait and treats delivery failures as log-and-continue:
/// a lost notification never rolls back a state change.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: LifecycleEvent) -> Result<(), DispatchError>;
}

/// Error surfaced by a dispatcher implementation.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Notification channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broadcast-backed event publisher. Local deployments and tests subscribe
/// directly; production wires a mail/push bridge onto the receiver side.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl NotificationDispatcher for EventPublisher {
    async fn dispatch(&self, event: LifecycleEvent) -> Result<(), DispatchError> {
        // A broadcast send fails only when there are no subscribers, which is
        // acceptable here: events are raised whether or not anyone listens.
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_reaches_subscriber() {
        let publisher = EventPublisher::default();
        let mut rx = publisher.subscribe();

        let event = LifecycleEvent::new(
            LifecycleEventKind::Created,
            "10000042",
            vec!["u-1".to_string()],
            json!({"kind": "flow_change"}),
        );
        publisher.dispatch(event).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, LifecycleEventKind::Created);
        assert_eq!(received.request_id, "10000042");
        assert_eq!(received.recipients, vec!["u-1".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_without_subscribers_is_ok() {
        let publisher = EventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);

        let event = LifecycleEvent::new(
            LifecycleEventKind::Resolved,
            "20000001",
            vec![],
            json!({}),
        );
        assert!(publisher.dispatch(event).await.is_ok());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(LifecycleEventKind::Created.event_name(), "request.created");
        assert_eq!(
            LifecycleEventKind::StatusChanged.event_name(),
            "request.status_changed"
        );
        assert_eq!(LifecycleEventKind::Assigned.event_name(), "request.assigned");
        assert_eq!(LifecycleEventKind::Resolved.event_name(), "request.resolved");
    }
}

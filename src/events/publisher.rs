use std::sync::Arc;

use tokio::sync::broadcast;

use super::types::LifecycleEvent;
use crate::config::EngineConfig;

/// Receives lifecycle events after their transition has been committed.
///
/// Publishing is best-effort: the engine logs a returned error and carries on,
/// so implementations must not rely on the caller retrying.
pub trait NotificationDispatcher: Send + Sync {
    fn publish(&self, event: &LifecycleEvent) -> Result<(), PublishError>;
}

/// Event publisher backed by a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl BroadcastDispatcher {
    /// Create a new dispatcher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Dispatcher whose channel holds `notification_channel_capacity` events
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.notification_channel_capacity.max(1))
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationDispatcher for BroadcastDispatcher {
    fn publish(&self, event: &LifecycleEvent) -> Result<(), PublishError> {
        // send() only fails when nobody is subscribed, which is fine for notifications
        match self.sender.send(event.clone()) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }
}

impl Default for BroadcastDispatcher {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Delivers every event to each inner dispatcher in order.
///
/// Every dispatcher is tried even after one fails; the first error is returned.
#[derive(Clone, Default)]
pub struct FanoutDispatcher {
    dispatchers: Vec<Arc<dyn NotificationDispatcher>>,
}

impl FanoutDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        self.dispatchers.push(dispatcher);
        self
    }

    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }
}

impl NotificationDispatcher for FanoutDispatcher {
    fn publish(&self, event: &LifecycleEvent) -> Result<(), PublishError> {
        let mut first_error = None;
        for dispatcher in &self.dispatchers {
            if let Err(err) = dispatcher.publish(event) {
                tracing::warn!(
                    event_name = %event.event_name,
                    entity_id = %event.entity_id,
                    error = %err,
                    "Dispatcher in fanout failed"
                );
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Dispatcher that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDispatcher;

impl NotificationDispatcher for NoopDispatcher {
    fn publish(&self, _event: &LifecycleEvent) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Event sink rejected {event_name}: {message}")]
    Rejected { event_name: String, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::state_machine::EntityFamily;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(name: &str) -> LifecycleEvent {
        LifecycleEvent {
            entity_type: EntityFamily::PrintJob,
            entity_id: Uuid::new_v4(),
            event_name: name.to_string(),
            from_status: "pending_confirmation".to_string(),
            to_status: "quote_sent".to_string(),
            acting_role: Role::PrintCenter,
            actor_id: "pc-1".to_string(),
            version: 2,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    struct Failing;

    impl NotificationDispatcher for Failing {
        fn publish(&self, event: &LifecycleEvent) -> Result<(), PublishError> {
            Err(PublishError::Rejected {
                event_name: event.event_name.clone(),
                message: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let dispatcher = BroadcastDispatcher::new(4);
        assert_eq!(dispatcher.subscriber_count(), 0);
        assert!(dispatcher.publish(&event("print_job.quoted")).is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let dispatcher = BroadcastDispatcher::new(4);
        let mut receiver = dispatcher.subscribe();
        dispatcher.publish(&event("print_job.quoted")).unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_name, "print_job.quoted");
    }

    #[tokio::test]
    async fn test_from_config_sizes_channel() {
        let config = EngineConfig {
            notification_channel_capacity: 2,
            ..EngineConfig::default()
        };
        let dispatcher = BroadcastDispatcher::from_config(&config);
        let mut receiver = dispatcher.subscribe();
        for name in ["print_job.quoted", "print_job.accepted", "print_job.paid"] {
            dispatcher.publish(&event(name)).unwrap();
        }

        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(receiver.recv().await.unwrap().event_name, "print_job.accepted");
    }

    #[tokio::test]
    async fn test_fanout_reaches_all_despite_failure() {
        let broadcast = Arc::new(BroadcastDispatcher::new(4));
        let mut receiver = broadcast.subscribe();
        let fanout = FanoutDispatcher::new()
            .with(Arc::new(Failing))
            .with(broadcast.clone());
        assert_eq!(fanout.len(), 2);

        let result = fanout.publish(&event("print_job.ready"));
        assert!(matches!(result, Err(PublishError::Rejected { .. })));
        assert_eq!(receiver.recv().await.unwrap().event_name, "print_job.ready");
    }
}

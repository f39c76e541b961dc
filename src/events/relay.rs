//! Async forwarding of lifecycle events.
//!
//! The engine publishes synchronously; anything slow (push gateways, email,
//! webhooks) subscribes to the broadcast channel and runs in a relay task.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::publisher::PublishError;
use super::types::LifecycleEvent;

/// Async consumer of lifecycle events
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    async fn deliver(&self, event: LifecycleEvent) -> Result<(), PublishError>;

    fn name(&self) -> &str;
}

/// Forward events from `receiver` into `sink` until the channel closes.
///
/// Sink failures are logged and the relay keeps going. A lagging relay logs how
/// many events it skipped.
pub fn spawn_relay<S: EventSink>(
    mut receiver: broadcast::Receiver<LifecycleEvent>,
    sink: S,
) -> JoinHandle<RelayStats> {
    tokio::spawn(async move {
        let mut stats = RelayStats::default();
        info!(sink = sink.name(), "Lifecycle event relay started");

        loop {
            match receiver.recv().await {
                Ok(event) => {
                    debug!(
                        sink = sink.name(),
                        event_name = %event.event_name,
                        entity_id = %event.entity_id,
                        "Relaying lifecycle event"
                    );
                    let event_name = event.event_name.clone();
                    match sink.deliver(event).await {
                        Ok(()) => stats.delivered += 1,
                        Err(e) => {
                            stats.failed += 1;
                            error!(
                                sink = sink.name(),
                                event_name = %event_name,
                                error = %e,
                                "Event sink failed to deliver lifecycle event"
                            );
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    stats.skipped += count;
                    warn!(
                        sink = sink.name(),
                        lagged_count = count,
                        "Event relay lagged behind - some events were missed"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!(sink = sink.name(), "Event channel closed - stopping relay");
                    break;
                }
            }
        }

        stats
    })
}

/// Counters returned when a relay stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BroadcastDispatcher, NotificationDispatcher};
    use crate::models::Role;
    use crate::state_machine::EntityFamily;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct Collecting {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventSink for Collecting {
        async fn deliver(&self, event: LifecycleEvent) -> Result<(), PublishError> {
            if event.event_name == "task.rejected" {
                return Err(PublishError::ChannelClosed);
            }
            self.seen.lock().push(event.event_name);
            Ok(())
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    fn event(name: &str) -> LifecycleEvent {
        LifecycleEvent {
            entity_type: EntityFamily::Task,
            entity_id: Uuid::new_v4(),
            event_name: name.to_string(),
            from_status: "pending_approval".to_string(),
            to_status: "pending_assignment".to_string(),
            acting_role: Role::Admin,
            actor_id: "admin-1".to_string(),
            version: 2,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_until_closed() {
        let dispatcher = BroadcastDispatcher::new(8);
        let sink = Collecting::default();
        let handle = spawn_relay(dispatcher.subscribe(), sink.clone());

        dispatcher.publish(&event("task.approved")).unwrap();
        dispatcher.publish(&event("task.rejected")).unwrap();
        dispatcher.publish(&event("task.assigned")).unwrap();
        drop(dispatcher);

        let stats = handle.await.unwrap();
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(*sink.seen.lock(), vec!["task.approved", "task.assigned"]);
    }
}

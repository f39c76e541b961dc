//! In-memory audit trail of lifecycle events.

use parking_lot::RwLock;
use std::collections::VecDeque;

use super::publisher::{NotificationDispatcher, PublishError};
use super::types::LifecycleEvent;
use crate::config::EngineConfig;
use crate::models::EntityId;

/// Bounded recorder keeping the most recent events, oldest evicted first
#[derive(Debug)]
pub struct ActivityLog {
    entries: RwLock<VecDeque<LifecycleEvent>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// Log sized by `activity_log_capacity`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.activity_log_capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All retained events, oldest first
    pub fn entries(&self) -> Vec<LifecycleEvent> {
        self.entries.read().iter().cloned().collect()
    }

    /// Retained events for one entity, oldest first
    pub fn entries_for(&self, entity_id: EntityId) -> Vec<LifecycleEvent> {
        self.entries
            .read()
            .iter()
            .filter(|event| event.entity_id == entity_id)
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<LifecycleEvent> {
        self.entries.read().back().cloned()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl NotificationDispatcher for ActivityLog {
    fn publish(&self, event: &LifecycleEvent) -> Result<(), PublishError> {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::state_machine::EntityFamily;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(id: EntityId, version: u64) -> LifecycleEvent {
        LifecycleEvent {
            entity_type: EntityFamily::Task,
            entity_id: id,
            event_name: "task.quoted".to_string(),
            from_status: "pending_va_acceptance".to_string(),
            to_status: "quote_received".to_string(),
            acting_role: Role::Va,
            actor_id: "va-1".to_string(),
            version,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_from_config_applies_capacity() {
        let config = EngineConfig {
            activity_log_capacity: 3,
            ..EngineConfig::default()
        };
        let log = ActivityLog::from_config(&config);
        assert_eq!(log.capacity(), 3);

        let id = Uuid::new_v4();
        for version in 1..=5 {
            log.publish(&event(id, version)).unwrap();
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].version, 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let log = ActivityLog::new(2);
        let id = Uuid::new_v4();
        for version in 1..=3 {
            log.publish(&event(id, version)).unwrap();
        }
        let versions: Vec<u64> = log.entries().iter().map(|e| e.version).collect();
        assert_eq!(versions, vec![2, 3]);
        assert_eq!(log.latest().map(|e| e.version), Some(3));
    }

    #[test]
    fn test_entries_for_entity() {
        let log = ActivityLog::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        log.publish(&event(a, 2)).unwrap();
        log.publish(&event(b, 2)).unwrap();
        log.publish(&event(a, 3)).unwrap();
        assert_eq!(log.entries_for(a).len(), 2);
        assert_eq!(log.entries_for(b).len(), 1);
    }
}

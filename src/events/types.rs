//! Lifecycle event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EntityId, Role};
use crate::state_machine::EntityFamily;

/// Notification emitted after a transition commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub entity_type: EntityFamily,
    pub entity_id: EntityId,
    /// Dotted name such as `task.quoted` or `print_job.ready`
    pub event_name: String,
    pub from_status: String,
    pub to_status: String,
    pub acting_role: Role,
    pub actor_id: String,
    /// Entity version after the change
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn is_status_change(&self) -> bool {
        self.from_status != self.to_status
    }

    /// Render as a JSON value for sinks that forward events elsewhere
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "entity_type": self.entity_type.as_str(),
            "entity_id": self.entity_id.to_string(),
            "event_name": self.event_name,
            "from_status": self.from_status,
            "to_status": self.to_status,
            "acting_role": self.acting_role.as_str(),
            "actor_id": self.actor_id,
            "version": self.version,
            "reason": self.reason,
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_event_json_shape() {
        let event = LifecycleEvent {
            entity_type: EntityFamily::Task,
            entity_id: Uuid::nil(),
            event_name: "task.requoted".to_string(),
            from_status: "quote_received".to_string(),
            to_status: "quote_received".to_string(),
            acting_role: Role::Va,
            actor_id: "va-1".to_string(),
            version: 5,
            reason: None,
            timestamp: Utc::now(),
        };

        assert!(!event.is_status_change());
        let json = event.to_json();
        assert_eq!(json["entity_type"], "task");
        assert_eq!(json["acting_role"], "va");
        assert_eq!(json["version"], 5);

        let encoded = serde_json::to_string(&event).unwrap();
        assert!(!encoded.contains("\"reason\""));
    }
}

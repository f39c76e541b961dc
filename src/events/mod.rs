//! # Lifecycle Notifications
//!
//! Post-commit delivery of [`LifecycleEvent`]s. Dispatchers are synchronous and
//! best-effort; slow consumers hang off a [`BroadcastDispatcher`] through
//! [`spawn_relay`].

pub mod activity_log;
pub mod publisher;
pub mod relay;
pub mod types;

// Re-export key types for convenience
pub use activity_log::ActivityLog;
pub use publisher::{
    BroadcastDispatcher, FanoutDispatcher, NoopDispatcher, NotificationDispatcher, PublishError,
};
pub use relay::{spawn_relay, EventSink, RelayStats};
pub use types::LifecycleEvent;

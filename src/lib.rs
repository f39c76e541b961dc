#![allow(clippy::doc_markdown)] // Allow technical terms like STIPS, VA in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # STIPS Core
//!
//! Task lifecycle engine for the STIPS Lite marketplace, where students post
//! academic and business tasks, virtual assistants (VAs) quote and deliver
//! them, and print centers fulfil print jobs.
//!
//! ## Architecture
//!
//! From leaf to root:
//!
//! - [`state_machine`] - Status vocabularies, the edge registry, permission
//!   checks, guards and transition side effects
//! - [`store`] - Shared in-memory entity store with compare-and-swap commits,
//!   transition history and VA workload counters
//! - [`engine`] - The lifecycle engine: submission, transitions, payment
//!   confirmation and role-scoped queries
//! - [`events`] - Best-effort lifecycle notifications
//! - [`config`] / [`settings`] - Engine configuration and admin settings
//!
//! Every transition is validated against the registry, authorized, guarded,
//! committed atomically and then announced. Notification failures never undo a
//! committed change.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stips_core::config::EngineConfig;
//! use stips_core::engine::{LifecycleEngine, TaskTransitionRequest};
//! use stips_core::events::ActivityLog;
//! use stips_core::models::{Actor, TaskDraft};
//! use stips_core::state_machine::{TaskStatus, TaskTransition};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new(ActivityLog::default());
//! let engine = LifecycleEngine::from_config(EngineConfig::default(), log.clone());
//!
//! let task = engine.submit_task(&Actor::student("s-1"), TaskDraft::new("Essay", "assignment", 4))?;
//! let task = engine.request_task_transition(TaskTransitionRequest::new(
//!     &task,
//!     Actor::super_admin("admin-1"),
//!     TaskTransition::Approve,
//! ))?;
//!
//! assert_eq!(task.status, TaskStatus::PendingAssignment);
//! assert_eq!(log.latest().map(|e| e.event_name), Some("task.approved".to_string()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod settings;
pub mod state_machine;
pub mod store;

pub use config::{ConfigManager, EngineConfig, TaskTypeSettings};
pub use engine::{LifecycleEngine, PrintJobTransitionRequest, TaskTransitionRequest};
pub use error::{Result, StipsError};
pub use events::{LifecycleEvent, NotificationDispatcher};
pub use models::{Actor, Capability, CapabilitySet, PrintJob, Role, Task};
pub use settings::{SettingsProvider, StaticSettings};
pub use state_machine::{
    LifecycleError, PrintJobStatus, PrintJobTransition, TaskStatus, TaskTransition,
};
pub use store::EntityStore;

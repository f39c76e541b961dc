//! # Domain Models
//!
//! Entity records owned by the lifecycle engine. Entities are created through the
//! submission path, mutated only by lifecycle transitions and never deleted: a
//! finished task or print job stays in the store in its terminal state.

pub mod actor;
pub mod common;
pub mod print_job;
pub mod task;

// Re-export core models for easy access
pub use actor::{Actor, Capability, CapabilitySet, Role};
pub use common::{EntityId, FileRef, PaymentStatus};
pub use print_job::{PrintJob, PrintJobDraft};
pub use task::{AssignmentMode, Task, TaskDraft};

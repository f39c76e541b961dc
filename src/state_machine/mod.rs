// State machine module for the task and print job lifecycles
//
// Status vocabularies, the edge registry, permission checks, guards and side
// effects. The engine composes these; nothing here touches the store.

pub mod actions;
pub mod authorization;
pub mod entity;
pub mod errors;
pub mod guards;
pub mod registry;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use entity::{LifecycleEntity, Ownership, WorkloadDelta};
pub use errors::{ActionError, GuardError, LifecycleError, LifecycleResult};
pub use registry::{EdgeRule, EdgeSource, LifecycleState, Permission, StatusRegistry};
pub use states::{EntityFamily, PrintJobStatus, TaskStatus};
pub use transitions::{
    LifecycleTransition, PrintJobTransition, PrintJobTransitionKind, TaskTransition,
    TaskTransitionKind,
};

// Common traits and utilities
pub use actions::StateAction;
pub use authorization::authorize;
pub use guards::{GuardContext, StateGuard};

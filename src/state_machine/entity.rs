//! Binding between stored entities and their lifecycle.
//!
//! [`LifecycleEntity`] is what lets one transition pipeline drive both tasks and
//! print jobs: it exposes the entity's status, version and ownership, and hands
//! guard checks and side effects to the family-specific code in
//! [`super::guards`] and [`super::actions`].

use chrono::{DateTime, Utc};

use super::actions;
use super::errors::GuardResult;
use super::guards::{self, GuardContext};
use super::registry::LifecycleState;
use super::states::{PrintJobStatus, TaskStatus};
use super::transitions::{LifecycleTransition, PrintJobTransition, TaskTransition};
use crate::models::{Actor, EntityId, PrintJob, Task};

/// Parties attached to an entity, used for permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership<'a> {
    pub owner_id: &'a str,
    pub assigned_va_id: Option<&'a str>,
    pub print_center_id: Option<&'a str>,
}

/// Change to a VA's active-task counter committed together with a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadDelta {
    Increment { va_id: String },
    Decrement { va_id: String },
}

pub trait LifecycleEntity: Clone + Send + Sync + 'static {
    type Status: LifecycleState;
    type Transition: LifecycleTransition<Kind = <Self::Status as LifecycleState>::Kind>;

    fn id(&self) -> EntityId;

    fn status(&self) -> Self::Status;

    fn version(&self) -> u64;

    fn created_at(&self) -> DateTime<Utc>;

    fn ownership(&self) -> Ownership<'_>;

    /// Write the committed status, version and timestamps.
    fn stamp(&mut self, status: Self::Status, version: u64, at: DateTime<Utc>);

    /// Run the preconditions attached to `transition`.
    fn check_guards(&self, transition: &Self::Transition, ctx: &GuardContext<'_>) -> GuardResult<()>;

    /// Apply the field changes that accompany `transition`.
    fn apply_effects(&mut self, transition: &Self::Transition, actor: &Actor);

    /// Workload counter change implied by moving from `before` to `self`.
    fn workload_delta(&self, _before: &Self) -> Option<WorkloadDelta> {
        None
    }
}

impl LifecycleEntity for Task {
    type Status = TaskStatus;
    type Transition = TaskTransition;

    fn id(&self) -> EntityId {
        self.id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership {
            owner_id: &self.owner_id,
            assigned_va_id: self.assigned_va_id.as_deref(),
            print_center_id: None,
        }
    }

    fn stamp(&mut self, status: TaskStatus, version: u64, at: DateTime<Utc>) {
        if self.status != status {
            self.status_changed_at = at;
        }
        self.status = status;
        self.version = version;
        self.updated_at = at;
    }

    fn check_guards(&self, transition: &TaskTransition, ctx: &GuardContext<'_>) -> GuardResult<()> {
        guards::check_task_guards(self, transition, ctx)
    }

    fn apply_effects(&mut self, transition: &TaskTransition, actor: &Actor) {
        actions::apply_task_effects(self, transition, actor);
    }

    fn workload_delta(&self, before: &Self) -> Option<WorkloadDelta> {
        match (before.status.holds_va_workload(), self.status.holds_va_workload()) {
            (false, true) => self
                .assigned_va_id
                .clone()
                .map(|va_id| WorkloadDelta::Increment { va_id }),
            (true, false) => before
                .assigned_va_id
                .clone()
                .map(|va_id| WorkloadDelta::Decrement { va_id }),
            _ => None,
        }
    }
}

impl LifecycleEntity for PrintJob {
    type Status = PrintJobStatus;
    type Transition = PrintJobTransition;

    fn id(&self) -> EntityId {
        self.id
    }

    fn status(&self) -> PrintJobStatus {
        self.status
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership {
            owner_id: &self.owner_id,
            assigned_va_id: None,
            print_center_id: Some(&self.print_center_id),
        }
    }

    fn stamp(&mut self, status: PrintJobStatus, version: u64, at: DateTime<Utc>) {
        if self.status != status {
            self.status_changed_at = at;
        }
        self.status = status;
        self.version = version;
        self.updated_at = at;
    }

    fn check_guards(
        &self,
        transition: &PrintJobTransition,
        ctx: &GuardContext<'_>,
    ) -> GuardResult<()> {
        guards::check_print_job_guards(self, transition, ctx)
    }

    fn apply_effects(&mut self, transition: &PrintJobTransition, actor: &Actor) {
        actions::apply_print_job_effects(self, transition, actor);
    }
}

//! Read access with role-scoped visibility.

use super::LifecycleEngine;
use crate::models::{Actor, PrintJob, Role, Task};
use crate::store::{PrintJobFilter, TaskFilter};

impl LifecycleEngine {
    /// Tasks matching `filter`, ordered by creation time
    pub fn query_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.store.query_tasks(filter)
    }

    /// Tasks `actor` is allowed to see.
    ///
    /// Students see their own tasks. VAs see tasks assigned to them, the live
    /// pool and business tasks awaiting assignment to them. Admins see
    /// everything and print centers see no tasks.
    pub fn visible_tasks(&self, actor: &Actor, filter: &TaskFilter) -> Vec<Task> {
        match actor.role {
            Role::Student => self
                .store
                .select_tasks(|task| task.owner_id == actor.id && filter.matches(task)),
            Role::Va => self.store.select_tasks(|task| {
                (task.is_assigned_to(&actor.id)
                    || task.is_in_live_pool()
                    || task.is_awaiting_designated_va(&actor.id))
                    && filter.matches(task)
            }),
            Role::Admin | Role::System => self.store.query_tasks(filter),
            Role::PrintCenter => Vec::new(),
        }
    }

    /// Approved tasks open for any VA to claim
    pub fn live_pool(&self) -> Vec<Task> {
        self.store.select_tasks(Task::is_in_live_pool)
    }

    pub fn query_print_jobs(&self, filter: &PrintJobFilter) -> Vec<PrintJob> {
        self.store.query_print_jobs(filter)
    }

    /// Print jobs `actor` is allowed to see: owners and the receiving print
    /// center see their jobs, admins see everything
    pub fn visible_print_jobs(&self, actor: &Actor, filter: &PrintJobFilter) -> Vec<PrintJob> {
        match actor.role {
            Role::Student => self
                .store
                .select_print_jobs(|job| job.owner_id == actor.id && filter.matches(job)),
            Role::PrintCenter => self
                .store
                .select_print_jobs(|job| job.print_center_id == actor.id && filter.matches(job)),
            Role::Admin | Role::System => self.store.query_print_jobs(filter),
            Role::Va => Vec::new(),
        }
    }

    /// Active tasks currently counted against a VA's limit
    pub fn va_workload(&self, va_id: &str) -> u32 {
        self.store.workload(va_id)
    }
}

//! # Entity Store
//!
//! Shared in-memory store for tasks and print jobs. All mutation goes through
//! [`EntityStore::commit`], a compare-and-swap on `(status, version)` that also
//! appends the transition history and adjusts VA workload counters while the
//! entity's shard lock is held. Either everything lands or nothing does.

pub mod collection;
pub mod error;
pub mod filter;

use dashmap::DashMap;

use crate::models::{EntityId, PrintJob, Task};
use crate::state_machine::{LifecycleEntity, LifecycleState, WorkloadDelta};

pub use collection::{ChangeContext, Collection, Expected, TransitionRecord};
pub use error::{StoreError, StoreResult};
pub use filter::{AssignmentKind, PrintJobFilter, TaskFilter};

/// Entity families the store knows how to hold
pub trait StoredEntity: LifecycleEntity {
    fn collection(store: &EntityStore) -> &Collection<Self>;
}

impl StoredEntity for Task {
    fn collection(store: &EntityStore) -> &Collection<Self> {
        &store.tasks
    }
}

impl StoredEntity for PrintJob {
    fn collection(store: &EntityStore) -> &Collection<Self> {
        &store.print_jobs
    }
}

#[derive(Debug)]
pub struct EntityStore {
    tasks: Collection<Task>,
    print_jobs: Collection<PrintJob>,
    /// Active tasks per VA
    workloads: DashMap<String, u32>,
    max_active_tasks_per_va: u32,
}

impl EntityStore {
    pub fn new(max_active_tasks_per_va: u32) -> Self {
        Self {
            tasks: Collection::new(),
            print_jobs: Collection::new(),
            workloads: DashMap::new(),
            max_active_tasks_per_va,
        }
    }

    pub fn insert<E: StoredEntity>(&self, entity: E, change: ChangeContext) -> StoreResult<E> {
        E::collection(self).insert(entity, change)
    }

    pub fn get<E: StoredEntity>(&self, id: EntityId) -> StoreResult<E> {
        E::collection(self).get(id).ok_or(StoreError::NotFound {
            family: <E::Status as LifecycleState>::FAMILY,
            id,
        })
    }

    /// Transition history of an entity, oldest first
    pub fn history<E: StoredEntity>(&self, id: EntityId) -> StoreResult<Vec<TransitionRecord>> {
        E::collection(self).history(id).ok_or(StoreError::NotFound {
            family: <E::Status as LifecycleState>::FAMILY,
            id,
        })
    }

    /// Atomically replace an entity that still matches `expected`.
    ///
    /// A workload increment that would push the VA past the configured limit
    /// fails the whole commit with [`StoreError::WorkloadExceeded`].
    pub fn commit<E: StoredEntity>(
        &self,
        id: EntityId,
        expected: Expected<E::Status>,
        next: E,
        change: ChangeContext,
        workload: Option<WorkloadDelta>,
    ) -> StoreResult<E> {
        E::collection(self).compare_and_swap(id, expected, next, change, |_, _| match &workload {
            Some(delta) => self.apply_workload(delta),
            None => Ok(()),
        })
    }

    fn apply_workload(&self, delta: &WorkloadDelta) -> StoreResult<()> {
        match delta {
            WorkloadDelta::Increment { va_id } => {
                let mut active = self.workloads.entry(va_id.clone()).or_insert(0);
                if *active >= self.max_active_tasks_per_va {
                    return Err(StoreError::WorkloadExceeded {
                        va_id: va_id.clone(),
                        active: *active,
                        limit: self.max_active_tasks_per_va,
                    });
                }
                *active += 1;
            }
            WorkloadDelta::Decrement { va_id } => {
                if let Some(mut active) = self.workloads.get_mut(va_id) {
                    *active = active.saturating_sub(1);
                }
            }
        }
        Ok(())
    }

    /// Active tasks currently held by a VA
    pub fn workload(&self, va_id: &str) -> u32 {
        self.workloads.get(va_id).map(|active| *active).unwrap_or(0)
    }

    pub fn max_active_tasks_per_va(&self) -> u32 {
        self.max_active_tasks_per_va
    }

    pub fn get_task(&self, id: EntityId) -> StoreResult<Task> {
        self.get(id)
    }

    pub fn get_print_job(&self, id: EntityId) -> StoreResult<PrintJob> {
        self.get(id)
    }

    pub fn query_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks.select(|task| filter.matches(task))
    }

    pub fn query_print_jobs(&self, filter: &PrintJobFilter) -> Vec<PrintJob> {
        self.print_jobs.select(|job| filter.matches(job))
    }

    pub fn select_tasks<P: Fn(&Task) -> bool>(&self, predicate: P) -> Vec<Task> {
        self.tasks.select(predicate)
    }

    pub fn select_print_jobs<P: Fn(&PrintJob) -> bool>(&self, predicate: P) -> Vec<PrintJob> {
        self.print_jobs.select(predicate)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn print_job_count(&self) -> usize {
        self.print_jobs.len()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TaskDraft};
    use crate::state_machine::TaskStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn change() -> ChangeContext {
        ChangeContext {
            transition: "send_quote".to_string(),
            actor_id: "va-1".to_string(),
            acting_role: Role::Va,
            reason: None,
            at: Utc::now(),
        }
    }

    fn accepted_task(store: &EntityStore) -> Task {
        let mut task = Task::from_draft(
            Uuid::new_v4(),
            "student-1",
            TaskDraft::new("Essay", "assignment", 2),
            Utc::now(),
        );
        task.status = TaskStatus::PendingVaAcceptance;
        task.assigned_va_id = Some("va-1".to_string());
        store.insert(task, change()).unwrap()
    }

    fn quote(store: &EntityStore, task: &Task) -> StoreResult<Task> {
        let mut next = task.clone();
        next.status = TaskStatus::QuoteReceived;
        next.price_minor = Some(1_500);
        store.commit(
            task.id,
            Expected::new(task.status, task.version),
            next,
            change(),
            Some(WorkloadDelta::Increment {
                va_id: "va-1".to_string(),
            }),
        )
    }

    #[test]
    fn test_workload_tracks_commits() {
        let store = EntityStore::new(2);
        let task = accepted_task(&store);
        quote(&store, &task).unwrap();
        assert_eq!(store.workload("va-1"), 1);
        assert_eq!(store.workload("va-2"), 0);
    }

    #[test]
    fn test_workload_limit_blocks_commit() {
        let store = EntityStore::new(1);
        let first = accepted_task(&store);
        let second = accepted_task(&store);
        quote(&store, &first).unwrap();

        let err = quote(&store, &second).unwrap_err();
        assert!(matches!(err, StoreError::WorkloadExceeded { active: 1, limit: 1, .. }));
        assert_eq!(store.workload("va-1"), 1);

        let untouched: Task = store.get(second.id).unwrap();
        assert_eq!(untouched, second);
        assert_eq!(store.history::<Task>(second.id).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_entity() {
        let store = EntityStore::default();
        assert!(matches!(
            store.get_task(Uuid::new_v4()),
            Err(StoreError::NotFound { .. })
        ));
    }
}

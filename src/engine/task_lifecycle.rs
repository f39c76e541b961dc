//! Task submission and transition entry points.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LifecycleEngine;
use crate::events::LifecycleEvent;
use crate::logging;
use crate::models::{Actor, Capability, EntityId, PaymentStatus, Role, Task, TaskDraft};
use crate::state_machine::{
    authorize, EntityFamily, LifecycleEntity, LifecycleError, LifecycleResult, StatusRegistry,
    TaskStatus, TaskTransition, TaskTransitionKind,
};
use crate::store::{ChangeContext, Expected, TransitionRecord};

/// Identity used for transitions driven by the payment processor
pub const PAYMENT_ACTOR_ID: &str = "payment-processor";

/// A caller's request to move a task along its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTransitionRequest {
    pub task_id: EntityId,
    /// Version the caller last read; a mismatch fails with `ConflictingTransition`
    pub expected_version: u64,
    pub actor: Actor,
    pub transition: TaskTransition,
}

impl TaskTransitionRequest {
    pub fn new(task: &Task, actor: Actor, transition: TaskTransition) -> Self {
        Self {
            task_id: task.id,
            expected_version: task.version,
            actor,
            transition,
        }
    }
}

impl LifecycleEngine {
    /// Create a task in `pending_approval` on behalf of a student
    pub fn submit_task(&self, actor: &Actor, draft: TaskDraft) -> LifecycleResult<Task> {
        if actor.role != Role::Student {
            return Err(LifecycleError::SubmissionForbidden {
                family: EntityFamily::Task,
                role: actor.role,
                actor_id: actor.id.clone(),
            });
        }
        self.validate_task_draft(&draft)?;

        let now = Utc::now();
        let mut draft = draft;
        draft.title = draft.title.trim().to_string();
        let task = Task::from_draft(Uuid::new_v4(), actor.id.clone(), draft, now);

        let task = self.store.insert(
            task,
            ChangeContext {
                transition: "submit".to_string(),
                actor_id: actor.id.clone(),
                acting_role: actor.role,
                reason: None,
                at: now,
            },
        )?;

        tracing::info!(
            task_id = %task.id,
            owner_id = %task.owner_id,
            task_type = %task.task_type,
            live_pool = task.assignment.is_live_pool(),
            "Task submitted"
        );

        self.publish(&LifecycleEvent {
            entity_type: EntityFamily::Task,
            entity_id: task.id,
            event_name: "task.submitted_for_approval".to_string(),
            from_status: task.status.to_string(),
            to_status: task.status.to_string(),
            acting_role: actor.role,
            actor_id: actor.id.clone(),
            version: task.version,
            reason: None,
            timestamp: now,
        });

        Ok(task)
    }

    fn validate_task_draft(&self, draft: &TaskDraft) -> LifecycleResult<()> {
        if draft.title.trim().is_empty() {
            return Err(LifecycleError::Validation("Task title must not be empty".to_string()));
        }
        if draft.page_count == 0 {
            return Err(LifecycleError::Validation(
                "Task page count must be at least 1".to_string(),
            ));
        }
        if !self.settings.is_allowed(&draft.task_type) {
            return Err(LifecycleError::Validation(format!(
                "Task type '{}' is not offered",
                draft.task_type
            )));
        }
        if let Some(va_id) = draft.assignment.designated_va() {
            if va_id.trim().is_empty() {
                return Err(LifecycleError::Validation(
                    "Direct tasks must name a VA".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply a caller-requested task transition
    pub fn request_task_transition(&self, request: TaskTransitionRequest) -> LifecycleResult<Task> {
        let TaskTransitionRequest {
            task_id,
            expected_version,
            actor,
            transition,
        } = request;
        self.execute::<Task>(task_id, Some(expected_version), &actor, transition)
    }

    /// Record the owner's payment and start the work.
    ///
    /// Only path from `approved_payment_due` to `in_progress`. A second
    /// confirmation fails because the task has already left that state.
    pub fn confirm_payment(&self, task_id: EntityId, payment_reference: &str) -> LifecycleResult<Task> {
        let system = Actor::system(PAYMENT_ACTOR_ID);
        self.execute::<Task>(
            task_id,
            None,
            &system,
            TaskTransition::ConfirmPayment {
                payment_reference: payment_reference.to_string(),
            },
        )
    }

    /// Mark the VA payout of a completed task as settled.
    ///
    /// Only the payment status changes; the task stays `completed`.
    pub fn settle_payout(&self, actor: &Actor, task_id: EntityId) -> LifecycleResult<Task> {
        let task = self.store.get_task(task_id)?;

        if !actor.has_capability(Capability::ManagePayouts) {
            let err = LifecycleError::Forbidden {
                family: EntityFamily::Task,
                id: task_id,
                role: actor.role,
                actor_id: actor.id.clone(),
                transition: "settle_payout".to_string(),
            };
            logging::log_rejection("task", &task_id.to_string(), "settle_payout", &actor.id, err.code(), &err.to_string());
            return Err(err);
        }

        if task.status != TaskStatus::Completed || task.payment_status != PaymentStatus::PayoutPending {
            return Err(LifecycleError::PreconditionFailed {
                reason: format!(
                    "Payout can only be settled for completed tasks awaiting payout (status {}, payment {})",
                    task.status, task.payment_status
                ),
            });
        }

        let now = Utc::now();
        let mut next = task.clone();
        next.payment_status = PaymentStatus::PayoutSettled;
        let settled = self.store.commit(
            task_id,
            Expected::new(task.status, task.version),
            next,
            ChangeContext {
                transition: "settle_payout".to_string(),
                actor_id: actor.id.clone(),
                acting_role: actor.role,
                reason: None,
                at: now,
            },
            None,
        )?;

        tracing::info!(
            task_id = %task_id,
            va_id = settled.assigned_va_id.as_deref(),
            price_minor = settled.price_minor,
            "Task payout settled"
        );

        self.publish(&LifecycleEvent {
            entity_type: EntityFamily::Task,
            entity_id: task_id,
            event_name: "task.payout_settled".to_string(),
            from_status: settled.status.to_string(),
            to_status: settled.status.to_string(),
            acting_role: actor.role,
            actor_id: actor.id.clone(),
            version: settled.version,
            reason: None,
            timestamp: now,
        });

        Ok(settled)
    }

    pub fn get_task(&self, task_id: EntityId) -> LifecycleResult<Task> {
        Ok(self.store.get_task(task_id)?)
    }

    /// Committed changes of a task, oldest first
    pub fn task_history(&self, task_id: EntityId) -> LifecycleResult<Vec<TransitionRecord>> {
        Ok(self.store.history::<Task>(task_id)?)
    }

    /// Transitions `actor` could request on the task right now, ignoring guards
    pub fn available_task_transitions(
        &self,
        actor: &Actor,
        task_id: EntityId,
    ) -> LifecycleResult<Vec<TaskTransitionKind>> {
        let task = self.store.get_task(task_id)?;
        let mut kinds = Vec::new();
        for rule in StatusRegistry::outgoing(task.status) {
            if authorize(actor, rule.permitted, &task.ownership()) && !kinds.contains(&rule.kind) {
                kinds.push(rule.kind);
            }
        }
        Ok(kinds)
    }
}

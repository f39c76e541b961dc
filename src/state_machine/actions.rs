use std::sync::Arc;

use super::errors::{ActionError, ActionResult};
use super::transitions::{LifecycleTransition, PrintJobTransition, TaskTransition};
use crate::events::{LifecycleEvent, NotificationDispatcher};
use crate::models::{Actor, AssignmentMode, PaymentStatus, PrintJob, Task};

/// Apply the field changes that accompany a task transition.
///
/// Runs on a working copy before the store commit, so the new status and every
/// side effect become visible together or not at all.
pub fn apply_task_effects(task: &mut Task, transition: &TaskTransition, actor: &Actor) {
    match transition {
        TaskTransition::AssignVa { va_id } => {
            task.assigned_va_id = Some(va_id.trim().to_string());
        }
        TaskTransition::ClaimFromPool => {
            task.assigned_va_id = Some(actor.id.clone());
        }
        TaskTransition::SendQuote { price_minor } => {
            task.price_minor = Some(*price_minor);
        }
        TaskTransition::ConfirmPayment { payment_reference } => {
            task.payment_status = PaymentStatus::PaidByOwner;
            task.payment_reference = Some(payment_reference.trim().to_string());
        }
        TaskTransition::SubmitWork { deliverables } => {
            task.deliverables.extend(deliverables.iter().cloned());
        }
        TaskTransition::Complete => {
            if task.payment_status == PaymentStatus::PaidByOwner {
                task.payment_status = PaymentStatus::PayoutPending;
            }
        }
        TaskTransition::Reassign => {
            // A declined business task has no VA left to go to
            if task.assignment.designated_va() == task.assigned_va_id.as_deref() {
                task.assignment = AssignmentMode::LivePool;
            }
            task.assigned_va_id = None;
        }
        TaskTransition::Cancel { .. } => {
            if task.payment_status == PaymentStatus::PaidByOwner {
                task.payment_status = PaymentStatus::Refunded;
            }
        }
        TaskTransition::Approve
        | TaskTransition::Reject { .. }
        | TaskTransition::DeclineByVa { .. }
        | TaskTransition::AcceptQuote
        | TaskTransition::RejectQuote { .. }
        | TaskTransition::RequestRevision { .. } => {}
    }

    if let Some(reason) = transition.reason() {
        task.last_reason = Some(reason.trim().to_string());
    }
}

/// Apply the field changes that accompany a print job transition.
pub fn apply_print_job_effects(job: &mut PrintJob, transition: &PrintJobTransition, _actor: &Actor) {
    match transition {
        PrintJobTransition::SetPrice { price_minor } => {
            job.price_minor = Some(*price_minor);
        }
        PrintJobTransition::ConfirmPayment { payment_reference } => {
            job.payment_status = PaymentStatus::PaidByOwner;
            job.payment_reference = Some(payment_reference.trim().to_string());
        }
        PrintJobTransition::AcceptOfflinePayment => {
            job.offline_payment_accepted = true;
        }
        PrintJobTransition::Cancel { .. } | PrintJobTransition::DeclineQuote { .. } => {
            if job.payment_status == PaymentStatus::PaidByOwner {
                job.payment_status = PaymentStatus::Refunded;
            }
        }
        PrintJobTransition::AcceptQuote
        | PrintJobTransition::StartPrinting
        | PrintJobTransition::MarkReady
        | PrintJobTransition::ConfirmPickup => {}
    }

    if let Some(reason) = transition.reason() {
        job.last_reason = Some(reason.trim().to_string());
    }
}

/// Trait for implementing actions that run after a transition is committed.
///
/// Failures are reported to the caller of [`StateAction::execute`] but never undo
/// the committed change.
pub trait StateAction<E>: Send + Sync {
    fn execute(&self, entity: &E, event: &LifecycleEvent) -> ActionResult<()>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str;
}

/// Action to publish lifecycle events when state transitions occur
pub struct PublishTransitionEventAction {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl PublishTransitionEventAction {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl<E> StateAction<E> for PublishTransitionEventAction {
    fn execute(&self, _entity: &E, event: &LifecycleEvent) -> ActionResult<()> {
        self.dispatcher
            .publish(event)
            .map_err(|_| ActionError::EventPublishFailed {
                event_name: event.event_name.clone(),
            })
    }

    fn description(&self) -> &'static str {
        "Publish lifecycle event for transition"
    }
}

/// Action to record entities reaching the end of their lifecycle
pub struct TerminalStateLogAction;

impl StateAction<Task> for TerminalStateLogAction {
    fn execute(&self, task: &Task, event: &LifecycleEvent) -> ActionResult<()> {
        if task.is_terminal() {
            tracing::info!(
                task_id = %task.id,
                status = %task.status,
                payment_status = %task.payment_status,
                reason = task.last_reason.as_deref(),
                event = %event.event_name,
                "Task reached terminal state"
            );
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log task terminal state"
    }
}

impl StateAction<PrintJob> for TerminalStateLogAction {
    fn execute(&self, job: &PrintJob, event: &LifecycleEvent) -> ActionResult<()> {
        if job.is_terminal() {
            tracing::info!(
                print_job_id = %job.id,
                status = %job.status,
                payment_status = %job.payment_status,
                reason = job.last_reason.as_deref(),
                event = %event.event_name,
                "Print job reached terminal state"
            );
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log print job terminal state"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileRef, PrintJobDraft, TaskDraft};
    use chrono::Utc;
    use uuid::Uuid;

    fn task() -> Task {
        Task::from_draft(
            Uuid::new_v4(),
            "student-1",
            TaskDraft::new("Business plan", "project", 10),
            Utc::now(),
        )
    }

    #[test]
    fn test_claim_assigns_acting_va() {
        let mut task = task();
        apply_task_effects(&mut task, &TaskTransition::ClaimFromPool, &Actor::va("va-3"));
        assert_eq!(task.assigned_va_id.as_deref(), Some("va-3"));
    }

    #[test]
    fn test_payment_side_effects() {
        let mut task = task();
        let system = Actor::system("payments");

        apply_task_effects(&mut task, &TaskTransition::send_quote(4_500), &Actor::va("va-1"));
        assert_eq!(task.price_minor, Some(4_500));

        apply_task_effects(
            &mut task,
            &TaskTransition::ConfirmPayment {
                payment_reference: " ref-9 ".to_string(),
            },
            &system,
        );
        assert_eq!(task.payment_status, PaymentStatus::PaidByOwner);
        assert_eq!(task.payment_reference.as_deref(), Some("ref-9"));

        let mut cancelled = task.clone();
        apply_task_effects(&mut cancelled, &TaskTransition::cancel("changed my mind"), &Actor::student("student-1"));
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
        assert_eq!(cancelled.last_reason.as_deref(), Some("changed my mind"));

        apply_task_effects(&mut task, &TaskTransition::Complete, &Actor::student("student-1"));
        assert_eq!(task.payment_status, PaymentStatus::PayoutPending);
    }

    #[test]
    fn test_deliverables_accumulate() {
        let mut task = task();
        let va = Actor::va("va-1");
        apply_task_effects(&mut task, &TaskTransition::submit_work(vec![FileRef::new("v1.docx")]), &va);
        apply_task_effects(&mut task, &TaskTransition::submit_work(vec![FileRef::new("v2.docx")]), &va);
        assert_eq!(task.deliverables.len(), 2);
        assert_eq!(task.deliverables[1].uri, "v2.docx");
    }

    #[test]
    fn test_print_job_price_overwrites() {
        let mut job = PrintJob::from_draft(
            Uuid::new_v4(),
            "student-1",
            PrintJobDraft::new("pc-1", "Flyers", 2),
            Utc::now(),
        );
        let center = Actor::print_center("pc-1");
        apply_print_job_effects(&mut job, &PrintJobTransition::set_price(500), &center);
        apply_print_job_effects(&mut job, &PrintJobTransition::set_price(600), &center);
        assert_eq!(job.price_minor, Some(600));

        apply_print_job_effects(&mut job, &PrintJobTransition::AcceptOfflinePayment, &center);
        assert!(job.offline_payment_accepted);
    }
}

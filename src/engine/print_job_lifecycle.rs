//! Print job submission and transition entry points.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task_lifecycle::PAYMENT_ACTOR_ID;
use super::LifecycleEngine;
use crate::events::LifecycleEvent;
use crate::models::{Actor, EntityId, PrintJob, PrintJobDraft, Role};
use crate::state_machine::{
    EntityFamily, LifecycleError, LifecycleResult, PrintJobTransition,
};
use crate::store::{ChangeContext, TransitionRecord};

/// A caller's request to move a print job along its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobTransitionRequest {
    pub job_id: EntityId,
    pub expected_version: u64,
    pub actor: Actor,
    pub transition: PrintJobTransition,
}

impl PrintJobTransitionRequest {
    pub fn new(job: &PrintJob, actor: Actor, transition: PrintJobTransition) -> Self {
        Self {
            job_id: job.id,
            expected_version: job.version,
            actor,
            transition,
        }
    }
}

impl LifecycleEngine {
    /// Send a print job to a print center on behalf of a student
    pub fn submit_print_job(&self, actor: &Actor, draft: PrintJobDraft) -> LifecycleResult<PrintJob> {
        if actor.role != Role::Student {
            return Err(LifecycleError::SubmissionForbidden {
                family: EntityFamily::PrintJob,
                role: actor.role,
                actor_id: actor.id.clone(),
            });
        }
        if draft.title.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "Print job title must not be empty".to_string(),
            ));
        }
        if draft.print_center_id.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "Print job must name a print center".to_string(),
            ));
        }
        if draft.page_count == 0 || draft.copies == 0 {
            return Err(LifecycleError::Validation(
                "Print job needs at least one page and one copy".to_string(),
            ));
        }

        let now = Utc::now();
        let job = PrintJob::from_draft(Uuid::new_v4(), actor.id.clone(), draft, now);
        let job = self.store.insert(
            job,
            ChangeContext {
                transition: "submit".to_string(),
                actor_id: actor.id.clone(),
                acting_role: actor.role,
                reason: None,
                at: now,
            },
        )?;

        tracing::info!(
            print_job_id = %job.id,
            owner_id = %job.owner_id,
            print_center_id = %job.print_center_id,
            total_pages = job.total_pages(),
            "Print job submitted"
        );

        self.publish(&LifecycleEvent {
            entity_type: EntityFamily::PrintJob,
            entity_id: job.id,
            event_name: "print_job.submitted".to_string(),
            from_status: job.status.to_string(),
            to_status: job.status.to_string(),
            acting_role: actor.role,
            actor_id: actor.id.clone(),
            version: job.version,
            reason: None,
            timestamp: now,
        });

        Ok(job)
    }

    /// Apply a caller-requested print job transition
    pub fn request_print_job_transition(
        &self,
        request: PrintJobTransitionRequest,
    ) -> LifecycleResult<PrintJob> {
        let PrintJobTransitionRequest {
            job_id,
            expected_version,
            actor,
            transition,
        } = request;
        self.execute::<PrintJob>(job_id, Some(expected_version), &actor, transition)
    }

    /// Record the owner's payment for a print job
    pub fn confirm_print_payment(
        &self,
        job_id: EntityId,
        payment_reference: &str,
    ) -> LifecycleResult<PrintJob> {
        let system = Actor::system(PAYMENT_ACTOR_ID);
        self.execute::<PrintJob>(
            job_id,
            None,
            &system,
            PrintJobTransition::ConfirmPayment {
                payment_reference: payment_reference.to_string(),
            },
        )
    }

    pub fn get_print_job(&self, job_id: EntityId) -> LifecycleResult<PrintJob> {
        Ok(self.store.get_print_job(job_id)?)
    }

    pub fn print_job_history(&self, job_id: EntityId) -> LifecycleResult<Vec<TransitionRecord>> {
        Ok(self.store.history::<PrintJob>(job_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::events::NoopDispatcher;
    use crate::state_machine::PrintJobStatus;
    use std::sync::Arc;

    #[test]
    fn test_submit_print_job() {
        let engine = LifecycleEngine::from_config(EngineConfig::default(), Arc::new(NoopDispatcher));
        let job = engine
            .submit_print_job(
                &Actor::student("s-1"),
                PrintJobDraft::new("pc-1", "Thesis binding", 120).with_copies(2),
            )
            .unwrap();
        assert_eq!(job.status, PrintJobStatus::PendingConfirmation);
        assert_eq!(job.total_pages(), 240);

        let err = engine
            .submit_print_job(&Actor::print_center("pc-1"), PrintJobDraft::new("pc-1", "Flyer", 1))
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        let err = engine
            .submit_print_job(&Actor::student("s-1"), PrintJobDraft::new(" ", "Flyer", 1))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }
}

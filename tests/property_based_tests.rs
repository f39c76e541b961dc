mod common;

use common::strategies::*;
use common::TestHarness;
use proptest::prelude::*;
use stips_core::engine::{PrintJobTransitionRequest, TaskTransitionRequest};
use stips_core::models::{Actor, PaymentStatus, PrintJobDraft};
use stips_core::state_machine::{
    PrintJobStatus, PrintJobTransition, StatusRegistry, TaskStatus, TaskTransition,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: any sequence of requests keeps a task inside its lifecycle
    #[test]
    fn random_task_requests_preserve_invariants(
        steps in prop::collection::vec((task_actor_strategy(), task_transition_strategy()), 1..40)
    ) {
        let harness = TestHarness::new();
        let mut task = harness.submit(common::essay_draft());

        for (actor, transition) in steps {
            let before = task.clone();
            let result = harness.engine.request_task_transition(
                TaskTransitionRequest::new(&task, actor, transition),
            );
            task = harness.engine.get_task(task.id).unwrap();

            prop_assert!(StatusRegistry::is_registered(task.status));
            prop_assert!(task.payment_is_consistent(), "inconsistent payment: {:?}", task);
            if task.status.requires_price() {
                prop_assert!(task.price_minor.is_some());
            }

            match result {
                Ok(updated) => {
                    prop_assert!(!before.is_terminal(), "terminal task moved: {:?}", before);
                    prop_assert_eq!(updated.version, before.version + 1);
                    prop_assert!(StatusRegistry::can_transition(before.status, updated.status));
                }
                Err(_) => {
                    prop_assert_eq!(&task, &before);
                }
            }

            let history = harness.engine.task_history(task.id).unwrap();
            prop_assert_eq!(history.len() as u64, task.version);

            let expected_workload = match &task.assigned_va_id {
                Some(va_id) if task.status.holds_va_workload() => {
                    prop_assert_eq!(harness.engine.va_workload(va_id), 1);
                    1
                }
                _ => 0,
            };
            let total: u32 = ["va-1", "va-2"]
                .iter()
                .map(|va_id| harness.engine.va_workload(va_id))
                .sum();
            prop_assert_eq!(total, expected_workload);
        }
    }

    /// Property: confirmed payments only ever happen once per task
    #[test]
    fn payment_confirmation_is_single_shot(references in prop::collection::vec("pay_[a-z0-9]{4,8}", 2..5)) {
        let harness = TestHarness::new();
        let task = harness.quoted(2_000);
        let task = harness.transition(&task, common::owner(), TaskTransition::AcceptQuote).unwrap();

        let successes = references
            .iter()
            .filter(|reference| harness.engine.confirm_payment(task.id, reference).is_ok())
            .count();
        prop_assert_eq!(successes, 1);

        let task = harness.engine.get_task(task.id).unwrap();
        prop_assert_eq!(task.status, TaskStatus::InProgress);
        prop_assert_eq!(task.payment_status, PaymentStatus::PaidByOwner);
        prop_assert_eq!(task.payment_reference.as_deref(), Some(references[0].as_str()));
    }

    /// Property: a print job never prints without a price and payment or offline acceptance
    #[test]
    fn random_print_job_requests_preserve_invariants(
        steps in prop::collection::vec((print_job_actor_strategy(), print_job_transition_strategy()), 1..30)
    ) {
        let harness = TestHarness::new();
        let mut job = harness.submit_print_job(PrintJobDraft::new("pc-1", "Lab report", 12));

        for (actor, transition) in steps {
            let before = job.clone();
            let result = harness.engine.request_print_job_transition(
                PrintJobTransitionRequest::new(&job, actor, transition),
            );
            job = harness.engine.get_print_job(job.id).unwrap();

            prop_assert!(StatusRegistry::is_registered(job.status));
            if matches!(
                job.status,
                PrintJobStatus::Printing | PrintJobStatus::ReadyForPickup | PrintJobStatus::Completed
            ) {
                prop_assert!(job.ready_to_print(), "printed without payment: {:?}", job);
            }
            if job.payment_status == PaymentStatus::Refunded {
                prop_assert_eq!(job.status, PrintJobStatus::Cancelled);
            }

            match result {
                Ok(updated) => {
                    prop_assert!(!before.is_terminal());
                    prop_assert_eq!(updated.version, before.version + 1);
                }
                Err(_) => {
                    prop_assert_eq!(&job, &before);
                }
            }
        }
    }
}

#[test]
fn system_actor_cannot_skip_print_job_steps() {
    let harness = TestHarness::new();
    let job = harness.submit_print_job(PrintJobDraft::new("pc-1", "Lab report", 12));
    let err = harness
        .print_transition(&job, Actor::system("payment-processor"), PrintJobTransition::set_price(300))
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");
}

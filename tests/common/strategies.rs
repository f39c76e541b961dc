#![allow(dead_code)]

use proptest::prelude::*;
use stips_core::models::{Actor, FileRef};
use stips_core::state_machine::{PrintJobTransition, TaskTransition};

/// Actors that might act on a task owned by `student-1`
pub fn task_actor_strategy() -> impl Strategy<Value = Actor> {
    prop_oneof![
        Just(Actor::student("student-1")),
        Just(Actor::student("student-2")),
        Just(Actor::va("va-1")),
        Just(Actor::va("va-2")),
        Just(Actor::super_admin("admin-1")),
        Just(Actor::system("payment-processor")),
        Just(Actor::print_center("pc-1")),
    ]
}

/// Optional justifications, blank ones included
pub fn reason_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("   ".to_string())),
        "[a-z]{3,12}( [a-z]{2,8}){0,3}".prop_map(Some),
    ]
}

pub fn task_transition_strategy() -> impl Strategy<Value = TaskTransition> {
    prop_oneof![forward_transition_strategy(), review_transition_strategy()]
}

/// Transitions from submission up to the quote
fn forward_transition_strategy() -> impl Strategy<Value = TaskTransition> {
    prop_oneof![
        Just(TaskTransition::Approve),
        reason_strategy().prop_map(|reason| TaskTransition::Reject { reason }),
        prop_oneof![Just("va-1"), Just("va-2")].prop_map(TaskTransition::assign_va),
        Just(TaskTransition::ClaimFromPool),
        reason_strategy().prop_map(|reason| TaskTransition::DeclineByVa { reason }),
        (0u64..30_000).prop_map(TaskTransition::send_quote),
        Just(TaskTransition::Reassign),
    ]
}

/// Transitions from quote acceptance to completion, plus cancellation
fn review_transition_strategy() -> impl Strategy<Value = TaskTransition> {
    prop_oneof![
        Just(TaskTransition::AcceptQuote),
        reason_strategy().prop_map(|reason| TaskTransition::RejectQuote { reason }),
        "pay_[a-z0-9]{4,8}".prop_map(|payment_reference| TaskTransition::ConfirmPayment { payment_reference }),
        prop::collection::vec("files://[a-z]{3,8}\\.pdf", 0..3).prop_map(|uris| {
            TaskTransition::submit_work(uris.into_iter().map(FileRef::new).collect())
        }),
        reason_strategy().prop_map(|reason| TaskTransition::RequestRevision { reason }),
        Just(TaskTransition::Complete),
        reason_strategy().prop_map(|reason| TaskTransition::Cancel { reason }),
    ]
}

/// Actors that might act on a print job owned by `student-1` at `pc-1`
pub fn print_job_actor_strategy() -> impl Strategy<Value = Actor> {
    prop_oneof![
        Just(Actor::student("student-1")),
        Just(Actor::print_center("pc-1")),
        Just(Actor::print_center("pc-2")),
        Just(Actor::super_admin("admin-1")),
        Just(Actor::system("payment-processor")),
    ]
}

pub fn print_job_transition_strategy() -> impl Strategy<Value = PrintJobTransition> {
    prop_oneof![
        (0u64..5_000).prop_map(PrintJobTransition::set_price),
        Just(PrintJobTransition::AcceptQuote),
        reason_strategy().prop_map(|reason| PrintJobTransition::DeclineQuote { reason }),
        "pay_[a-z0-9]{4,8}".prop_map(|payment_reference| PrintJobTransition::ConfirmPayment { payment_reference }),
        Just(PrintJobTransition::AcceptOfflinePayment),
        Just(PrintJobTransition::StartPrinting),
        Just(PrintJobTransition::MarkReady),
        Just(PrintJobTransition::ConfirmPickup),
        reason_strategy().prop_map(|reason| PrintJobTransition::Cancel { reason }),
    ]
}

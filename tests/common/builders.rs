//! Engine harness and lifecycle shortcuts shared by the integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Arc;

use stips_core::config::EngineConfig;
use stips_core::engine::{LifecycleEngine, PrintJobTransitionRequest, TaskTransitionRequest};
use stips_core::events::{ActivityLog, BroadcastDispatcher, FanoutDispatcher};
use stips_core::models::{Actor, FileRef, PrintJob, PrintJobDraft, Task, TaskDraft};
use stips_core::state_machine::{LifecycleResult, PrintJobTransition, TaskTransition};

pub const OWNER_ID: &str = "student-1";
pub const VA_ID: &str = "va-1";
pub const PRINT_CENTER_ID: &str = "pc-1";

pub fn owner() -> Actor {
    Actor::student(OWNER_ID)
}

pub fn va() -> Actor {
    Actor::va(VA_ID)
}

pub fn admin() -> Actor {
    Actor::super_admin("admin-1")
}

pub fn print_center() -> Actor {
    Actor::print_center(PRINT_CENTER_ID)
}

pub fn essay_draft() -> TaskDraft {
    TaskDraft::new("Essay on coastal erosion", "assignment", 6)
}

/// Engine wired to an activity log and a broadcast channel
pub struct TestHarness {
    pub engine: Arc<LifecycleEngine>,
    pub log: Arc<ActivityLog>,
    pub broadcast: Arc<BroadcastDispatcher>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let log = Arc::new(ActivityLog::from_config(&config));
        let broadcast = Arc::new(BroadcastDispatcher::from_config(&config));
        let fanout = FanoutDispatcher::new()
            .with(log.clone())
            .with(broadcast.clone());
        let engine = Arc::new(LifecycleEngine::from_config(config, Arc::new(fanout)));
        Self {
            engine,
            log,
            broadcast,
        }
    }

    pub fn submit(&self, draft: TaskDraft) -> Task {
        self.engine
            .submit_task(&owner(), draft)
            .expect("Failed to submit test task")
    }

    pub fn transition(&self, task: &Task, actor: Actor, transition: TaskTransition) -> LifecycleResult<Task> {
        self.engine
            .request_task_transition(TaskTransitionRequest::new(task, actor, transition))
    }

    fn step(&self, task: &Task, actor: Actor, transition: TaskTransition) -> Task {
        self.transition(task, actor, transition)
            .expect("Lifecycle step in test setup failed")
    }

    /// Approved task sitting in the live pool
    pub fn approved(&self) -> Task {
        let task = self.submit(essay_draft());
        self.step(&task, admin(), TaskTransition::Approve)
    }

    /// Task claimed by `va_id`, waiting for the VA's quote
    pub fn claimed_by(&self, va_id: &str) -> Task {
        let task = self.approved();
        self.step(&task, Actor::va(va_id), TaskTransition::ClaimFromPool)
    }

    pub fn quoted(&self, price_minor: u64) -> Task {
        let task = self.claimed_by(VA_ID);
        self.step(&task, va(), TaskTransition::send_quote(price_minor))
    }

    pub fn in_progress(&self) -> Task {
        let task = self.quoted(2_500);
        let task = self.step(&task, owner(), TaskTransition::AcceptQuote);
        self.engine
            .confirm_payment(task.id, "pay_test_001")
            .expect("Failed to confirm test payment")
    }

    pub fn submitted(&self) -> Task {
        let task = self.in_progress();
        self.step(
            &task,
            va(),
            TaskTransition::submit_work(vec![FileRef::named("files://essay-v1.docx", "essay-v1.docx")]),
        )
    }

    pub fn submit_print_job(&self, draft: PrintJobDraft) -> PrintJob {
        self.engine
            .submit_print_job(&owner(), draft)
            .expect("Failed to submit test print job")
    }

    pub fn print_transition(
        &self,
        job: &PrintJob,
        actor: Actor,
        transition: PrintJobTransition,
    ) -> LifecycleResult<PrintJob> {
        self.engine
            .request_print_job_transition(PrintJobTransitionRequest::new(job, actor, transition))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

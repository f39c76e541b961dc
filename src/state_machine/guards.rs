use super::errors::{business_rule_violation, GuardError, GuardResult};
use super::transitions::{LifecycleTransition, PrintJobTransition, PrintJobTransitionKind, TaskTransition, TaskTransitionKind};
use crate::models::{FileRef, PaymentStatus, PrintJob, Task};
use crate::settings::SettingsProvider;

/// Collaborators a guard may consult
pub struct GuardContext<'a> {
    pub settings: &'a dyn SettingsProvider,
}

/// Trait for implementing state transition guards
pub trait StateGuard<E, T> {
    /// Check if a transition is allowed
    fn check(&self, entity: &E, transition: &T, ctx: &GuardContext<'_>) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Guard to check that a quoted price is positive
pub struct PositivePriceGuard;

impl StateGuard<Task, TaskTransition> for PositivePriceGuard {
    fn check(&self, _task: &Task, transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        check_positive(transition.price_minor())
    }

    fn description(&self) -> &'static str {
        "Quoted price must be greater than zero"
    }
}

impl StateGuard<PrintJob, PrintJobTransition> for PositivePriceGuard {
    fn check(&self, _job: &PrintJob, transition: &PrintJobTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        check_positive(transition.price_minor())
    }

    fn description(&self) -> &'static str {
        "Quoted price must be greater than zero"
    }
}

fn check_positive(price_minor: Option<u64>) -> GuardResult<()> {
    match price_minor {
        Some(0) | None => Err(GuardError::NonPositivePrice),
        Some(_) => Ok(()),
    }
}

/// Guard to check a task quote against the admin-configured minimum for its type
pub struct MinimumQuoteGuard;

impl StateGuard<Task, TaskTransition> for MinimumQuoteGuard {
    fn check(&self, task: &Task, transition: &TaskTransition, ctx: &GuardContext<'_>) -> GuardResult<()> {
        let Some(quoted) = transition.price_minor() else {
            return Ok(());
        };
        let minimum = ctx.settings.minimum_quote_minor(&task.task_type, task.page_count);

        if quoted < minimum {
            return Err(GuardError::QuoteBelowMinimum {
                task_type: task.task_type.clone(),
                quoted,
                minimum,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Quote must meet the task type's minimum price"
    }
}

/// Guard to check that a price exists before payment-dependent transitions
pub struct PriceSetGuard;

impl StateGuard<Task, TaskTransition> for PriceSetGuard {
    fn check(&self, task: &Task, _transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        task.price_minor.map(|_| ()).ok_or(GuardError::PriceNotSet)
    }

    fn description(&self) -> &'static str {
        "A price must be set"
    }
}

impl StateGuard<PrintJob, PrintJobTransition> for PriceSetGuard {
    fn check(&self, job: &PrintJob, _transition: &PrintJobTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        job.price_minor.map(|_| ()).ok_or(GuardError::PriceNotSet)
    }

    fn description(&self) -> &'static str {
        "A price must be set"
    }
}

/// Guard to check that no payment has been recorded yet
pub struct UnpaidGuard;

impl StateGuard<Task, TaskTransition> for UnpaidGuard {
    fn check(&self, task: &Task, _transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        check_unpaid(task.payment_status)
    }

    fn description(&self) -> &'static str {
        "Payment must not already be recorded"
    }
}

impl StateGuard<PrintJob, PrintJobTransition> for UnpaidGuard {
    fn check(&self, job: &PrintJob, _transition: &PrintJobTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        check_unpaid(job.payment_status)
    }

    fn description(&self) -> &'static str {
        "Payment must not already be recorded"
    }
}

fn check_unpaid(status: PaymentStatus) -> GuardResult<()> {
    if status == PaymentStatus::Unpaid {
        Ok(())
    } else {
        Err(GuardError::AlreadyPaid {
            status: status.to_string(),
        })
    }
}

/// Guard to check that a payment confirmation carries a processor reference
pub struct PaymentReferenceGuard;

impl PaymentReferenceGuard {
    fn check_reference(reference: Option<&str>) -> GuardResult<()> {
        match reference {
            Some(reference) if !reference.trim().is_empty() => Ok(()),
            _ => Err(business_rule_violation("Payment confirmation requires a payment reference")),
        }
    }
}

impl StateGuard<Task, TaskTransition> for PaymentReferenceGuard {
    fn check(&self, _task: &Task, transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        match transition {
            TaskTransition::ConfirmPayment { payment_reference } => {
                Self::check_reference(Some(payment_reference))
            }
            _ => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Payment confirmation must carry a reference"
    }
}

impl StateGuard<PrintJob, PrintJobTransition> for PaymentReferenceGuard {
    fn check(&self, _job: &PrintJob, transition: &PrintJobTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        match transition {
            PrintJobTransition::ConfirmPayment { payment_reference } => {
                Self::check_reference(Some(payment_reference))
            }
            _ => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Payment confirmation must carry a reference"
    }
}

/// Guard to check that only live-pool tasks are claimed by VAs
pub struct LivePoolClaimGuard;

impl StateGuard<Task, TaskTransition> for LivePoolClaimGuard {
    fn check(&self, task: &Task, _transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        if task.assignment.is_live_pool() {
            Ok(())
        } else {
            Err(business_rule_violation(format!(
                "Task {} is a business task and must be assigned by an admin",
                task.id
            )))
        }
    }

    fn description(&self) -> &'static str {
        "Only live-pool tasks can be claimed"
    }
}

/// Guard to check that a business task goes to the VA it was created for
pub struct DesignatedVaGuard;

impl StateGuard<Task, TaskTransition> for DesignatedVaGuard {
    fn check(&self, task: &Task, transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        match (transition, task.assignment.designated_va()) {
            (TaskTransition::AssignVa { va_id }, Some(designated)) if va_id.trim() != designated => {
                Err(business_rule_violation(format!(
                    "Business task {} is designated for VA {designated}, not {}",
                    task.id,
                    va_id.trim()
                )))
            }
            _ => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Business tasks go to their designated VA"
    }
}

/// Guard to check that an assignment names a VA
pub struct AssigneePresentGuard;

impl StateGuard<Task, TaskTransition> for AssigneePresentGuard {
    fn check(&self, _task: &Task, transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        match transition {
            TaskTransition::AssignVa { va_id } if va_id.trim().is_empty() => {
                Err(business_rule_violation("Assignment requires a VA id"))
            }
            _ => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Assignment must name a VA"
    }
}

/// Guard to check that a work submission carries deliverables
pub struct DeliverablesPresentGuard;

impl StateGuard<Task, TaskTransition> for DeliverablesPresentGuard {
    fn check(&self, task: &Task, transition: &TaskTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        let submitted: &[FileRef] = match transition {
            TaskTransition::SubmitWork { deliverables } => deliverables,
            _ => &[],
        };

        if submitted.iter().any(|file| !file.uri.trim().is_empty()) {
            Ok(())
        } else {
            Err(business_rule_violation(format!(
                "Submission for task {} must include at least one deliverable",
                task.id
            )))
        }
    }

    fn description(&self) -> &'static str {
        "Work submissions must include deliverables"
    }
}

/// Guard for the printing invariant: priced, and paid or offline payment accepted
pub struct ReadyToPrintGuard;

impl StateGuard<PrintJob, PrintJobTransition> for ReadyToPrintGuard {
    fn check(&self, job: &PrintJob, _transition: &PrintJobTransition, _ctx: &GuardContext<'_>) -> GuardResult<()> {
        if job.price_minor.is_none() {
            return Err(GuardError::PriceNotSet);
        }
        if !job.ready_to_print() {
            return Err(GuardError::PaymentNotReceived);
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Job must be priced and paid (or offline payment accepted) before printing"
    }
}

fn run_guards<E, T>(
    guards: Vec<Box<dyn StateGuard<E, T>>>,
    entity: &E,
    transition: &T,
    ctx: &GuardContext<'_>,
) -> GuardResult<()> {
    for guard in guards {
        if let Err(err) = guard.check(entity, transition, ctx) {
            tracing::debug!(guard = guard.description(), error = %err, "Guard rejected transition");
            return Err(err);
        }
    }
    Ok(())
}

/// Check guard conditions for a task transition
pub fn check_task_guards(task: &Task, transition: &TaskTransition, ctx: &GuardContext<'_>) -> GuardResult<()> {
    let guards: Vec<Box<dyn StateGuard<Task, TaskTransition>>> = match transition.kind() {
        TaskTransitionKind::ClaimFromPool => vec![Box::new(LivePoolClaimGuard)],
        TaskTransitionKind::AssignVa => {
            vec![Box::new(AssigneePresentGuard), Box::new(DesignatedVaGuard)]
        }
        TaskTransitionKind::SendQuote => {
            vec![Box::new(PositivePriceGuard), Box::new(MinimumQuoteGuard)]
        }
        TaskTransitionKind::AcceptQuote => vec![Box::new(PriceSetGuard)],
        TaskTransitionKind::ConfirmPayment => vec![
            Box::new(PaymentReferenceGuard),
            Box::new(PriceSetGuard),
            Box::new(UnpaidGuard),
        ],
        TaskTransitionKind::SubmitWork => vec![Box::new(DeliverablesPresentGuard)],
        // No special guards for other transitions
        _ => Vec::new(),
    };
    run_guards(guards, task, transition, ctx)
}

/// Check guard conditions for a print job transition
pub fn check_print_job_guards(
    job: &PrintJob,
    transition: &PrintJobTransition,
    ctx: &GuardContext<'_>,
) -> GuardResult<()> {
    let guards: Vec<Box<dyn StateGuard<PrintJob, PrintJobTransition>>> = match transition.kind() {
        PrintJobTransitionKind::SetPrice => vec![Box::new(PositivePriceGuard)],
        PrintJobTransitionKind::AcceptQuote => vec![Box::new(PriceSetGuard)],
        PrintJobTransitionKind::ConfirmPayment => vec![
            Box::new(PaymentReferenceGuard),
            Box::new(PriceSetGuard),
            Box::new(UnpaidGuard),
        ],
        PrintJobTransitionKind::AcceptOfflinePayment => {
            vec![Box::new(PriceSetGuard), Box::new(UnpaidGuard)]
        }
        PrintJobTransitionKind::StartPrinting => vec![Box::new(ReadyToPrintGuard)],
        _ => Vec::new(),
    };
    run_guards(guards, job, transition, ctx)
}

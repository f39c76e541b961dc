//! # Status Registry
//!
//! The single source of truth for which edges exist in each entity family and who
//! may trigger them. Edges are plain data: each [`EdgeRule`] names the requested
//! transition kind, its source and target states, the permissions that unlock it,
//! whether it needs a written justification and the lifecycle event it emits.
//!
//! The engine never hard-codes a transition; it resolves `(current state,
//! requested kind)` here and then checks the rule.

use std::fmt;
use std::hash::Hash;

use super::states::{EntityFamily, PrintJobStatus, TaskStatus};
use super::transitions::{PrintJobTransitionKind, TaskTransitionKind};
use crate::models::Capability;

/// One way an actor can be entitled to trigger an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// The student who submitted the entity
    Owner,
    /// The VA currently assigned to the task
    AssignedVa,
    /// Any VA
    AnyVa,
    /// The print center the job was sent to
    AssignedPrintCenter,
    /// An admin holding the capability
    Admin(Capability),
    /// Automated caller (payment processor)
    System,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::AssignedVa => write!(f, "assigned_va"),
            Self::AnyVa => write!(f, "any_va"),
            Self::AssignedPrintCenter => write!(f, "assigned_print_center"),
            Self::Admin(capability) => write!(f, "admin:{capability}"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Where an edge may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource<S> {
    State(S),
    /// Every state that is not terminal
    AnyNonTerminal,
}

/// A permitted edge of a lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRule<S, K> {
    pub kind: K,
    pub from: EdgeSource<S>,
    pub to: S,
    pub permitted: &'static [Permission],
    pub requires_reason: bool,
    /// Name of the lifecycle event emitted on success
    pub event_name: &'static str,
}

/// A status vocabulary registered with the registry.
pub trait LifecycleState:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    type Kind: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    const FAMILY: EntityFamily;

    fn initial() -> Self;

    fn is_terminal_state(self) -> bool;

    fn all() -> &'static [Self];

    fn edges() -> &'static [EdgeRule<Self, Self::Kind>];
}

impl<S: LifecycleState, K> EdgeRule<S, K> {
    /// Check whether this edge can start from `state`
    pub fn starts_from(&self, state: S) -> bool {
        match self.from {
            EdgeSource::State(from) => from == state,
            EdgeSource::AnyNonTerminal => !state.is_terminal_state(),
        }
    }
}

const ADMIN_MODERATE: Permission = Permission::Admin(Capability::ModerateTasks);
const ADMIN_ASSIGN: Permission = Permission::Admin(Capability::AssignTasks);
const ADMIN_CANCEL: Permission = Permission::Admin(Capability::CancelAny);
const ADMIN_PRINT: Permission = Permission::Admin(Capability::ManagePrintJobs);

const fn task_edge(
    kind: TaskTransitionKind,
    from: TaskStatus,
    to: TaskStatus,
    permitted: &'static [Permission],
    requires_reason: bool,
    event_name: &'static str,
) -> EdgeRule<TaskStatus, TaskTransitionKind> {
    EdgeRule {
        kind,
        from: EdgeSource::State(from),
        to,
        permitted,
        requires_reason,
        event_name,
    }
}

const fn print_edge(
    kind: PrintJobTransitionKind,
    from: PrintJobStatus,
    to: PrintJobStatus,
    permitted: &'static [Permission],
    requires_reason: bool,
    event_name: &'static str,
) -> EdgeRule<PrintJobStatus, PrintJobTransitionKind> {
    EdgeRule {
        kind,
        from: EdgeSource::State(from),
        to,
        permitted,
        requires_reason,
        event_name,
    }
}

/// Task lifecycle graph.
pub static TASK_EDGES: &[EdgeRule<TaskStatus, TaskTransitionKind>] = {
    use TaskStatus as S;
    use TaskTransitionKind as K;
    &[
        task_edge(K::Approve, S::PendingApproval, S::PendingAssignment, &[ADMIN_MODERATE], false, "task.approved"),
        task_edge(K::Reject, S::PendingApproval, S::Rejected, &[ADMIN_MODERATE], true, "task.rejected"),
        task_edge(K::AssignVa, S::PendingAssignment, S::PendingVaAcceptance, &[ADMIN_ASSIGN], false, "task.assigned"),
        task_edge(K::ClaimFromPool, S::PendingAssignment, S::PendingVaAcceptance, &[Permission::AnyVa], false, "task.claimed"),
        task_edge(K::DeclineByVa, S::PendingVaAcceptance, S::RejectedByVa, &[Permission::AssignedVa], true, "task.declined_by_va"),
        task_edge(K::SendQuote, S::PendingVaAcceptance, S::QuoteReceived, &[Permission::AssignedVa, ADMIN_ASSIGN], false, "task.quoted"),
        task_edge(K::SendQuote, S::QuoteReceived, S::QuoteReceived, &[Permission::AssignedVa, ADMIN_ASSIGN], false, "task.requoted"),
        task_edge(K::AcceptQuote, S::QuoteReceived, S::ApprovedPaymentDue, &[Permission::Owner], false, "task.quote_accepted"),
        task_edge(K::RejectQuote, S::QuoteReceived, S::QuoteRejected, &[Permission::Owner], true, "task.quote_rejected"),
        task_edge(K::ConfirmPayment, S::ApprovedPaymentDue, S::InProgress, &[Permission::System], false, "task.payment_confirmed"),
        task_edge(K::SubmitWork, S::InProgress, S::SubmittedAwaitingReview, &[Permission::AssignedVa], false, "task.submitted"),
        task_edge(K::RequestRevision, S::SubmittedAwaitingReview, S::RevisionRequested, &[Permission::Owner], true, "task.revision_requested"),
        task_edge(K::SubmitWork, S::RevisionRequested, S::SubmittedAwaitingReview, &[Permission::AssignedVa], false, "task.resubmitted"),
        task_edge(K::Complete, S::SubmittedAwaitingReview, S::Completed, &[Permission::Owner, ADMIN_MODERATE], false, "task.completed"),
        task_edge(K::Reassign, S::RejectedByVa, S::PendingAssignment, &[ADMIN_ASSIGN], false, "task.reassigned"),
        EdgeRule {
            kind: K::Cancel,
            from: EdgeSource::AnyNonTerminal,
            to: S::Cancelled,
            permitted: &[Permission::Owner, ADMIN_CANCEL],
            requires_reason: true,
            event_name: "task.cancelled",
        },
    ]
};

/// Print job lifecycle graph.
pub static PRINT_JOB_EDGES: &[EdgeRule<PrintJobStatus, PrintJobTransitionKind>] = {
    use PrintJobStatus as S;
    use PrintJobTransitionKind as K;
    &[
        print_edge(K::SetPrice, S::PendingConfirmation, S::QuoteSent, &[Permission::AssignedPrintCenter], false, "print_job.quoted"),
        print_edge(K::SetPrice, S::QuoteSent, S::QuoteSent, &[Permission::AssignedPrintCenter], false, "print_job.requoted"),
        print_edge(K::AcceptQuote, S::QuoteSent, S::AwaitingPayment, &[Permission::Owner], false, "print_job.quote_accepted"),
        print_edge(K::DeclineQuote, S::QuoteSent, S::Cancelled, &[Permission::Owner], true, "print_job.quote_declined"),
        print_edge(K::ConfirmPayment, S::AwaitingPayment, S::PaymentConfirmed, &[Permission::System], false, "print_job.payment_confirmed"),
        print_edge(K::AcceptOfflinePayment, S::AwaitingPayment, S::PaymentConfirmed, &[Permission::AssignedPrintCenter], false, "print_job.offline_payment_accepted"),
        print_edge(K::StartPrinting, S::PaymentConfirmed, S::Printing, &[Permission::AssignedPrintCenter], false, "print_job.printing"),
        print_edge(K::MarkReady, S::Printing, S::ReadyForPickup, &[Permission::AssignedPrintCenter], false, "print_job.ready"),
        print_edge(K::ConfirmPickup, S::ReadyForPickup, S::Completed, &[Permission::AssignedPrintCenter, Permission::Owner], false, "print_job.completed"),
        EdgeRule {
            kind: K::Cancel,
            from: EdgeSource::AnyNonTerminal,
            to: S::Cancelled,
            permitted: &[Permission::Owner, Permission::AssignedPrintCenter, ADMIN_PRINT],
            requires_reason: true,
            event_name: "print_job.cancelled",
        },
    ]
};

impl LifecycleState for TaskStatus {
    type Kind = TaskTransitionKind;

    const FAMILY: EntityFamily = EntityFamily::Task;

    fn initial() -> Self {
        Self::PendingApproval
    }

    fn is_terminal_state(self) -> bool {
        self.is_terminal()
    }

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn edges() -> &'static [EdgeRule<Self, Self::Kind>] {
        TASK_EDGES
    }
}

impl LifecycleState for PrintJobStatus {
    type Kind = PrintJobTransitionKind;

    const FAMILY: EntityFamily = EntityFamily::PrintJob;

    fn initial() -> Self {
        Self::PendingConfirmation
    }

    fn is_terminal_state(self) -> bool {
        self.is_terminal()
    }

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn edges() -> &'static [EdgeRule<Self, Self::Kind>] {
        PRINT_JOB_EDGES
    }
}

/// Lookups over the registered lifecycle graphs.
pub struct StatusRegistry;

impl StatusRegistry {
    /// Resolve the edge a `kind` request follows from `from`, if any.
    pub fn resolve<S: LifecycleState>(
        from: S,
        kind: S::Kind,
    ) -> Option<&'static EdgeRule<S, S::Kind>> {
        S::edges()
            .iter()
            .find(|rule| rule.kind == kind && rule.starts_from(from))
    }

    /// Every edge leaving `from`.
    pub fn outgoing<S: LifecycleState>(from: S) -> Vec<&'static EdgeRule<S, S::Kind>> {
        S::edges().iter().filter(|rule| rule.starts_from(from)).collect()
    }

    /// Distinct target states reachable in one step from `from`.
    pub fn allowed_next_states<S: LifecycleState>(from: S) -> Vec<S> {
        let mut next = Vec::new();
        for rule in Self::outgoing(from) {
            if !next.contains(&rule.to) {
                next.push(rule.to);
            }
        }
        next
    }

    pub fn can_transition<S: LifecycleState>(from: S, to: S) -> bool {
        Self::outgoing(from).iter().any(|rule| rule.to == to)
    }

    /// Whether `state` belongs to the family's vocabulary.
    pub fn is_registered<S: LifecycleState>(state: S) -> bool {
        S::all().contains(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_graph_matches_lifecycle() {
        use TaskStatus as S;
        assert!(StatusRegistry::can_transition(S::PendingApproval, S::PendingAssignment));
        assert!(StatusRegistry::can_transition(S::PendingApproval, S::Rejected));
        assert!(StatusRegistry::can_transition(S::PendingVaAcceptance, S::RejectedByVa));
        assert!(StatusRegistry::can_transition(S::ApprovedPaymentDue, S::InProgress));
        assert!(StatusRegistry::can_transition(S::RevisionRequested, S::SubmittedAwaitingReview));
        assert!(!StatusRegistry::can_transition(S::PendingApproval, S::InProgress));
        assert!(!StatusRegistry::can_transition(S::InProgress, S::Completed));
    }

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        for state in TaskStatus::ALL.into_iter().filter(TaskStatus::is_terminal) {
            assert!(StatusRegistry::outgoing(state).is_empty(), "{state} has edges");
        }
        for state in PrintJobStatus::ALL.into_iter().filter(PrintJobStatus::is_terminal) {
            assert!(StatusRegistry::outgoing(state).is_empty(), "{state} has edges");
        }
    }

    #[test]
    fn test_every_non_terminal_state_can_be_cancelled() {
        for state in TaskStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            let rule = StatusRegistry::resolve(state, TaskTransitionKind::Cancel).unwrap();
            assert_eq!(rule.to, TaskStatus::Cancelled);
            assert!(rule.requires_reason);
        }
        for state in PrintJobStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(StatusRegistry::resolve(state, PrintJobTransitionKind::Cancel).is_some());
        }
    }

    #[test]
    fn test_send_quote_resolves_from_both_quote_states() {
        let first =
            StatusRegistry::resolve(TaskStatus::PendingVaAcceptance, TaskTransitionKind::SendQuote)
                .unwrap();
        assert_eq!(first.event_name, "task.quoted");

        let again =
            StatusRegistry::resolve(TaskStatus::QuoteReceived, TaskTransitionKind::SendQuote).unwrap();
        assert_eq!(again.to, TaskStatus::QuoteReceived);
        assert_eq!(again.event_name, "task.requoted");

        assert!(
            StatusRegistry::resolve(TaskStatus::ApprovedPaymentDue, TaskTransitionKind::SendQuote)
                .is_none()
        );
    }

    #[test]
    fn test_only_admins_approve() {
        let rule =
            StatusRegistry::resolve(TaskStatus::PendingApproval, TaskTransitionKind::Approve).unwrap();
        assert_eq!(rule.permitted, &[Permission::Admin(Capability::ModerateTasks)]);
    }

    #[test]
    fn test_print_job_graph() {
        use PrintJobStatus as S;
        assert_eq!(
            StatusRegistry::allowed_next_states(S::QuoteSent),
            vec![S::QuoteSent, S::AwaitingPayment, S::Cancelled]
        );
        assert_eq!(
            StatusRegistry::allowed_next_states(S::AwaitingPayment),
            vec![S::PaymentConfirmed, S::Cancelled]
        );
        assert!(StatusRegistry::is_registered(S::Printing));
    }

    #[test]
    fn test_permission_display() {
        assert_eq!(Permission::Admin(Capability::CancelAny).to_string(), "admin:cancel_any");
        assert_eq!(Permission::AssignedVa.to_string(), "assigned_va");
    }
}

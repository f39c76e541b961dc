use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity family a status vocabulary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFamily {
    Task,
    PrintJob,
}

impl EntityFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::PrintJob => "print_job",
        }
    }
}

impl fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketplace task states.
///
/// ```text
/// pending_approval → pending_assignment → pending_va_acceptance → quote_received
///                  → rejected                                   → rejected_by_va → pending_assignment
/// quote_received → approved_payment_due → in_progress → submitted_awaiting_review → completed
///                → quote_rejected                       ↕ revision_requested
/// any non-terminal → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state when the owner submits the task
    #[default]
    PendingApproval,
    /// Approved and waiting for a VA
    PendingAssignment,
    /// A VA has been assigned or claimed the task and has not answered yet
    PendingVaAcceptance,
    /// The assigned VA declined; an admin may put the task back up for assignment
    RejectedByVa,
    /// A price has been quoted to the owner
    QuoteReceived,
    /// Owner accepted the quote; waiting for payment
    ApprovedPaymentDue,
    /// Paid and being worked on
    InProgress,
    /// Deliverables submitted for the owner's review
    SubmittedAwaitingReview,
    /// Owner asked for changes
    RevisionRequested,
    /// Owner accepted the work
    Completed,
    /// Withdrawn by the owner or an admin
    Cancelled,
    /// Refused at moderation
    Rejected,
    /// Owner refused the quote
    QuoteRejected,
}

impl TaskStatus {
    pub const ALL: [Self; 13] = [
        Self::PendingApproval,
        Self::PendingAssignment,
        Self::PendingVaAcceptance,
        Self::RejectedByVa,
        Self::QuoteReceived,
        Self::ApprovedPaymentDue,
        Self::InProgress,
        Self::SubmittedAwaitingReview,
        Self::RevisionRequested,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
        Self::QuoteRejected,
    ];

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Rejected | Self::QuoteRejected
        )
    }

    /// States at or beyond the point where a price must exist
    pub fn requires_price(&self) -> bool {
        matches!(
            self,
            Self::QuoteReceived
                | Self::ApprovedPaymentDue
                | Self::InProgress
                | Self::SubmittedAwaitingReview
                | Self::RevisionRequested
                | Self::Completed
        )
    }

    /// States in which the task counts against its VA's active workload
    pub fn holds_va_workload(&self) -> bool {
        matches!(
            self,
            Self::QuoteReceived
                | Self::ApprovedPaymentDue
                | Self::InProgress
                | Self::SubmittedAwaitingReview
                | Self::RevisionRequested
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::PendingAssignment => "pending_assignment",
            Self::PendingVaAcceptance => "pending_va_acceptance",
            Self::RejectedByVa => "rejected_by_va",
            Self::QuoteReceived => "quote_received",
            Self::ApprovedPaymentDue => "approved_payment_due",
            Self::InProgress => "in_progress",
            Self::SubmittedAwaitingReview => "submitted_awaiting_review",
            Self::RevisionRequested => "revision_requested",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::QuoteRejected => "quote_rejected",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Invalid task status: {s}"))
    }
}

/// Print job states.
///
/// ```text
/// pending_confirmation → quote_sent → awaiting_payment → payment_confirmed
///   → printing → ready_for_pickup → completed
/// any non-terminal → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrintJobStatus {
    /// Initial state when the owner submits the job
    #[default]
    PendingConfirmation,
    /// The print center quoted a price
    QuoteSent,
    /// Owner accepted the price
    AwaitingPayment,
    /// Paid, or the print center accepted offline payment
    PaymentConfirmed,
    Printing,
    ReadyForPickup,
    Completed,
    Cancelled,
}

impl PrintJobStatus {
    pub const ALL: [Self; 8] = [
        Self::PendingConfirmation,
        Self::QuoteSent,
        Self::AwaitingPayment,
        Self::PaymentConfirmed,
        Self::Printing,
        Self::ReadyForPickup,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Check if the print center is physically handling the job
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Printing | Self::ReadyForPickup)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingConfirmation => "pending_confirmation",
            Self::QuoteSent => "quote_sent",
            Self::AwaitingPayment => "awaiting_payment",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::Printing => "printing",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PrintJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrintJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Invalid print job status: {s}"))
    }
}

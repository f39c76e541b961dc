use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::FileRef;

/// A requested transition carrying its payload.
pub trait LifecycleTransition: fmt::Debug + Send + Sync {
    /// Payload-free name used to look the edge up in the registry.
    type Kind: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    /// Free-text justification, when the transition carries one.
    fn reason(&self) -> Option<&str>;
}

/// Transitions that can be requested on a marketplace task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TaskTransition {
    /// Admin approves a submitted task
    Approve,
    /// Admin refuses a submitted task
    Reject { reason: Option<String> },
    /// Admin assigns the task to a VA
    AssignVa { va_id: String },
    /// A VA claims a live-pool task for themselves
    ClaimFromPool,
    /// The assigned VA turns the task down
    DeclineByVa { reason: Option<String> },
    /// Quote (or re-quote) a price to the owner
    SendQuote { price_minor: u64 },
    /// Owner accepts the quote
    AcceptQuote,
    /// Owner refuses the quote
    RejectQuote { reason: Option<String> },
    /// Payment processor confirmed the owner's payment
    ConfirmPayment { payment_reference: String },
    /// The assigned VA delivers work (first submission or after a revision request)
    SubmitWork { deliverables: Vec<FileRef> },
    /// Owner sends the work back
    RequestRevision { reason: Option<String> },
    /// Owner accepts the work
    Complete,
    /// Admin returns a VA-declined task to assignment
    Reassign,
    /// Owner or admin withdraws the task
    Cancel { reason: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTransitionKind {
    Approve,
    Reject,
    AssignVa,
    ClaimFromPool,
    DeclineByVa,
    SendQuote,
    AcceptQuote,
    RejectQuote,
    ConfirmPayment,
    SubmitWork,
    RequestRevision,
    Complete,
    Reassign,
    Cancel,
}

impl TaskTransitionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::AssignVa => "assign_va",
            Self::ClaimFromPool => "claim_from_pool",
            Self::DeclineByVa => "decline_by_va",
            Self::SendQuote => "send_quote",
            Self::AcceptQuote => "accept_quote",
            Self::RejectQuote => "reject_quote",
            Self::ConfirmPayment => "confirm_payment",
            Self::SubmitWork => "submit_work",
            Self::RequestRevision => "request_revision",
            Self::Complete => "complete",
            Self::Reassign => "reassign",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for TaskTransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TaskTransition {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: Some(reason.into()),
        }
    }

    pub fn assign_va(va_id: impl Into<String>) -> Self {
        Self::AssignVa {
            va_id: va_id.into(),
        }
    }

    pub fn decline_by_va(reason: impl Into<String>) -> Self {
        Self::DeclineByVa {
            reason: Some(reason.into()),
        }
    }

    pub fn send_quote(price_minor: u64) -> Self {
        Self::SendQuote { price_minor }
    }

    pub fn reject_quote(reason: impl Into<String>) -> Self {
        Self::RejectQuote {
            reason: Some(reason.into()),
        }
    }

    pub fn submit_work(deliverables: Vec<FileRef>) -> Self {
        Self::SubmitWork { deliverables }
    }

    pub fn request_revision(reason: impl Into<String>) -> Self {
        Self::RequestRevision {
            reason: Some(reason.into()),
        }
    }

    pub fn cancel(reason: impl Into<String>) -> Self {
        Self::Cancel {
            reason: Some(reason.into()),
        }
    }

    /// Get a string representation of the transition for logging
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Quoted price if this is a quote transition
    pub fn price_minor(&self) -> Option<u64> {
        match self {
            Self::SendQuote { price_minor } => Some(*price_minor),
            _ => None,
        }
    }
}

impl LifecycleTransition for TaskTransition {
    type Kind = TaskTransitionKind;

    fn kind(&self) -> TaskTransitionKind {
        match self {
            Self::Approve => TaskTransitionKind::Approve,
            Self::Reject { .. } => TaskTransitionKind::Reject,
            Self::AssignVa { .. } => TaskTransitionKind::AssignVa,
            Self::ClaimFromPool => TaskTransitionKind::ClaimFromPool,
            Self::DeclineByVa { .. } => TaskTransitionKind::DeclineByVa,
            Self::SendQuote { .. } => TaskTransitionKind::SendQuote,
            Self::AcceptQuote => TaskTransitionKind::AcceptQuote,
            Self::RejectQuote { .. } => TaskTransitionKind::RejectQuote,
            Self::ConfirmPayment { .. } => TaskTransitionKind::ConfirmPayment,
            Self::SubmitWork { .. } => TaskTransitionKind::SubmitWork,
            Self::RequestRevision { .. } => TaskTransitionKind::RequestRevision,
            Self::Complete => TaskTransitionKind::Complete,
            Self::Reassign => TaskTransitionKind::Reassign,
            Self::Cancel { .. } => TaskTransitionKind::Cancel,
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            Self::Reject { reason }
            | Self::DeclineByVa { reason }
            | Self::RejectQuote { reason }
            | Self::RequestRevision { reason }
            | Self::Cancel { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Transitions that can be requested on a print job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PrintJobTransition {
    /// Print center quotes (or re-quotes) a price
    SetPrice { price_minor: u64 },
    /// Owner accepts the price
    AcceptQuote,
    /// Owner refuses the price
    DeclineQuote { reason: Option<String> },
    /// Payment processor confirmed the owner's payment
    ConfirmPayment { payment_reference: String },
    /// Print center agrees to collect payment offline
    AcceptOfflinePayment,
    StartPrinting,
    MarkReady,
    /// Job handed over to the owner
    ConfirmPickup,
    Cancel { reason: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintJobTransitionKind {
    SetPrice,
    AcceptQuote,
    DeclineQuote,
    ConfirmPayment,
    AcceptOfflinePayment,
    StartPrinting,
    MarkReady,
    ConfirmPickup,
    Cancel,
}

impl PrintJobTransitionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetPrice => "set_price",
            Self::AcceptQuote => "accept_quote",
            Self::DeclineQuote => "decline_quote",
            Self::ConfirmPayment => "confirm_payment",
            Self::AcceptOfflinePayment => "accept_offline_payment",
            Self::StartPrinting => "start_printing",
            Self::MarkReady => "mark_ready",
            Self::ConfirmPickup => "confirm_pickup",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PrintJobTransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PrintJobTransition {
    pub fn set_price(price_minor: u64) -> Self {
        Self::SetPrice { price_minor }
    }

    pub fn decline_quote(reason: impl Into<String>) -> Self {
        Self::DeclineQuote {
            reason: Some(reason.into()),
        }
    }

    pub fn cancel(reason: impl Into<String>) -> Self {
        Self::Cancel {
            reason: Some(reason.into()),
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn price_minor(&self) -> Option<u64> {
        match self {
            Self::SetPrice { price_minor } => Some(*price_minor),
            _ => None,
        }
    }
}

impl LifecycleTransition for PrintJobTransition {
    type Kind = PrintJobTransitionKind;

    fn kind(&self) -> PrintJobTransitionKind {
        match self {
            Self::SetPrice { .. } => PrintJobTransitionKind::SetPrice,
            Self::AcceptQuote => PrintJobTransitionKind::AcceptQuote,
            Self::DeclineQuote { .. } => PrintJobTransitionKind::DeclineQuote,
            Self::ConfirmPayment { .. } => PrintJobTransitionKind::ConfirmPayment,
            Self::AcceptOfflinePayment => PrintJobTransitionKind::AcceptOfflinePayment,
            Self::StartPrinting => PrintJobTransitionKind::StartPrinting,
            Self::MarkReady => PrintJobTransitionKind::MarkReady,
            Self::ConfirmPickup => PrintJobTransitionKind::ConfirmPickup,
            Self::Cancel { .. } => PrintJobTransitionKind::Cancel,
        }
    }

    fn reason(&self) -> Option<&str> {
        match self {
            Self::DeclineQuote { reason } | Self::Cancel { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

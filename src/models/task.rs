//! # Task Model
//!
//! Marketplace task submitted by a student and worked on by a VA.
//!
//! ## Overview
//!
//! A `Task` starts in `pending_approval` when the owner submits a [`TaskDraft`]
//! and moves through the lifecycle described in
//! [`crate::state_machine::states::TaskStatus`]. Descriptive fields are fixed at
//! creation; status, assignment, price and payment fields are only written by
//! the lifecycle engine as side effects of transitions.
//!
//! ## Assignment
//!
//! Tasks reach a VA in one of two ways:
//! - **Live pool**: any VA may claim the task once it is approved.
//! - **Direct**: a business task earmarked for one VA; only an admin assigns it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, FileRef, PaymentStatus};
use crate::state_machine::states::TaskStatus;

/// How a task reaches a VA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Open to any VA once approved.
    #[default]
    LivePool,
    /// Business task intended for a specific VA.
    Direct { va_id: String },
}

impl AssignmentMode {
    pub fn is_live_pool(&self) -> bool {
        matches!(self, Self::LivePool)
    }

    pub fn designated_va(&self) -> Option<&str> {
        match self {
            Self::LivePool => None,
            Self::Direct { va_id } => Some(va_id),
        }
    }
}

/// Owner-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub task_type: String,
    pub page_count: u32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
    #[serde(default)]
    pub assignment: AssignmentMode,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, task_type: impl Into<String>, page_count: u32) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            task_type: task_type.into(),
            page_count,
            deadline: None,
            attachments: Vec::new(),
            assignment: AssignmentMode::LivePool,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_attachment(mut self, attachment: FileRef) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Mark the draft as a business task for `va_id`.
    pub fn direct_to(mut self, va_id: impl Into<String>) -> Self {
        self.assignment = AssignmentMode::Direct {
            va_id: va_id.into(),
        };
        self
    }
}

/// Task record as held by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub page_count: u32,
    pub status: TaskStatus,
    pub assignment: AssignmentMode,
    pub assigned_va_id: Option<String>,
    pub price_minor: Option<u64>,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub attachments: Vec<FileRef>,
    pub deliverables: Vec<FileRef>,
    /// Justification given with the most recent decline, rejection, revision or cancellation.
    pub last_reason: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh task in the initial state from an owner draft.
    pub fn from_draft(id: EntityId, owner_id: impl Into<String>, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            title: draft.title,
            description: draft.description,
            task_type: draft.task_type,
            page_count: draft.page_count,
            status: TaskStatus::default(),
            assignment: draft.assignment,
            assigned_va_id: None,
            price_minor: None,
            payment_status: PaymentStatus::Unpaid,
            payment_reference: None,
            deadline: draft.deadline,
            attachments: draft.attachments,
            deliverables: Vec::new(),
            last_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
            status_changed_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Open for any VA to claim.
    pub fn is_in_live_pool(&self) -> bool {
        self.status == TaskStatus::PendingAssignment && self.assignment.is_live_pool()
    }

    /// Business task waiting for assignment to `va_id`.
    pub fn is_awaiting_designated_va(&self, va_id: &str) -> bool {
        self.status == TaskStatus::PendingAssignment && self.assignment.designated_va() == Some(va_id)
    }

    pub fn is_assigned_to(&self, va_id: &str) -> bool {
        self.assigned_va_id.as_deref() == Some(va_id)
    }

    /// Check that the payment status agrees with the lifecycle status.
    pub fn payment_is_consistent(&self) -> bool {
        use TaskStatus as S;
        match self.payment_status {
            PaymentStatus::Unpaid => !matches!(
                self.status,
                S::InProgress | S::SubmittedAwaitingReview | S::RevisionRequested | S::Completed
            ),
            PaymentStatus::PaidByOwner => matches!(
                self.status,
                S::InProgress | S::SubmittedAwaitingReview | S::RevisionRequested
            ),
            PaymentStatus::PayoutPending | PaymentStatus::PayoutSettled => {
                self.status == S::Completed
            }
            PaymentStatus::Refunded => self.status == S::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_task() -> Task {
        let draft = TaskDraft::new("Essay on tides", "assignment", 4)
            .with_attachment(FileRef::new("files://brief.pdf"));
        Task::from_draft(Uuid::new_v4(), "student-1", draft, Utc::now())
    }

    #[test]
    fn test_new_task_starts_pending_approval() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::PendingApproval);
        assert_eq!(task.version, 1);
        assert_eq!(task.payment_status, PaymentStatus::Unpaid);
        assert!(task.price_minor.is_none());
        assert_eq!(task.attachments.len(), 1);
        assert!(task.payment_is_consistent());
    }

    #[test]
    fn test_live_pool_membership() {
        let mut task = sample_task();
        assert!(!task.is_in_live_pool());
        task.status = TaskStatus::PendingAssignment;
        assert!(task.is_in_live_pool());
        task.assignment = AssignmentMode::Direct {
            va_id: "va-9".to_string(),
        };
        assert!(!task.is_in_live_pool());
    }

    #[test]
    fn test_payment_consistency_rules() {
        let mut task = sample_task();
        task.payment_status = PaymentStatus::PaidByOwner;
        assert!(!task.payment_is_consistent());
        task.status = TaskStatus::InProgress;
        assert!(task.payment_is_consistent());
        task.payment_status = PaymentStatus::Refunded;
        assert!(!task.payment_is_consistent());
    }

    #[test]
    fn test_assignment_mode_serde() {
        let mode = AssignmentMode::Direct {
            va_id: "va-2".to_string(),
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "direct", "va_id": "va-2"}));
    }
}

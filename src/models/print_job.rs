//! # Print Job Model
//!
//! Document printing request addressed to a single print center. Shares the
//! task's shape but uses its own status vocabulary, and may proceed on an offline
//! payment the print center explicitly accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EntityId, FileRef, PaymentStatus};
use crate::state_machine::states::PrintJobStatus;

/// Owner-supplied fields for a new print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJobDraft {
    pub print_center_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub page_count: u32,
    #[serde(default = "default_copies")]
    pub copies: u32,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
}

fn default_copies() -> u32 {
    1
}

impl PrintJobDraft {
    pub fn new(print_center_id: impl Into<String>, title: impl Into<String>, page_count: u32) -> Self {
        Self {
            print_center_id: print_center_id.into(),
            title: title.into(),
            description: String::new(),
            page_count,
            copies: default_copies(),
            color: false,
            attachments: Vec::new(),
        }
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }

    pub fn in_color(mut self) -> Self {
        self.color = true;
        self
    }

    pub fn with_attachment(mut self, attachment: FileRef) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Print job record as held by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: EntityId,
    pub owner_id: String,
    pub print_center_id: String,
    pub title: String,
    pub description: String,
    pub page_count: u32,
    pub copies: u32,
    pub color: bool,
    pub status: PrintJobStatus,
    pub price_minor: Option<u64>,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    /// The print center agreed to collect payment outside the platform.
    pub offline_payment_accepted: bool,
    pub attachments: Vec<FileRef>,
    pub last_reason: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

impl PrintJob {
    pub fn from_draft(id: EntityId, owner_id: impl Into<String>, draft: PrintJobDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            print_center_id: draft.print_center_id,
            title: draft.title,
            description: draft.description,
            page_count: draft.page_count,
            copies: draft.copies,
            color: draft.color,
            status: PrintJobStatus::default(),
            price_minor: None,
            payment_status: PaymentStatus::Unpaid,
            payment_reference: None,
            offline_payment_accepted: false,
            attachments: draft.attachments,
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

    /// Price is set and payment is either received or explicitly deferred.
    pub fn ready_to_print(&self) -> bool {
        self.price_minor.is_some()
            && (self.payment_status.is_funded() || self.offline_payment_accepted)
    }

    /// Total sheets the print center has to produce.
    pub fn total_pages(&self) -> u64 {
        u64::from(self.page_count) * u64::from(self.copies)
    }
}

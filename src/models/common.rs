//! Shared value types used by both entity families.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier assigned by the entity store.
pub type EntityId = Uuid;

/// Reference to a file held by the external storage service.
///
/// Only the reference is kept; binary content never passes through the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FileRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
        }
    }

    pub fn named(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: Some(name.into()),
        }
    }
}

/// Money movement attached to a task or print job.
///
/// ```text
/// unpaid → paid_by_owner → payout_pending → payout_settled
///                        → refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PaidByOwner,
    PayoutPending,
    PayoutSettled,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [Self; 5] = [
        Self::Unpaid,
        Self::PaidByOwner,
        Self::PayoutPending,
        Self::PayoutSettled,
        Self::Refunded,
    ];

    /// Valid next payment states from the current one.
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Unpaid => &[Self::PaidByOwner],
            Self::PaidByOwner => &[Self::PayoutPending, Self::Refunded],
            Self::PayoutPending => &[Self::PayoutSettled],
            Self::PayoutSettled | Self::Refunded => &[],
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// True once the owner's money has been received.
    pub fn is_funded(self) -> bool {
        matches!(
            self,
            Self::PaidByOwner | Self::PayoutPending | Self::PayoutSettled
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PaidByOwner => "paid_by_owner",
            Self::PayoutPending => "payout_pending",
            Self::PayoutSettled => "payout_settled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid payment status: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_graph() {
        assert!(PaymentStatus::Unpaid.can_transition_to(PaymentStatus::PaidByOwner));
        assert!(PaymentStatus::PaidByOwner.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Unpaid.can_transition_to(PaymentStatus::PayoutSettled));
        assert!(PaymentStatus::Refunded.allowed_next_states().is_empty());
    }

    #[test]
    fn test_payment_status_string_conversion() {
        assert_eq!(PaymentStatus::PayoutPending.to_string(), "payout_pending");
        assert_eq!(
            "paid_by_owner".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::PaidByOwner
        );
        assert!("paid".parse::<PaymentStatus>().is_err());
    }
}

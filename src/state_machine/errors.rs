use thiserror::Error;

use super::states::EntityFamily;
use crate::models::{EntityId, Role};

/// Errors returned to callers of the lifecycle engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{family} {id} not found")]
    NotFound { family: EntityFamily, id: EntityId },

    #[error("Invalid state transition: cannot {transition} {family} {id} from {from}")]
    InvalidTransition {
        family: EntityFamily,
        id: EntityId,
        from: String,
        transition: String,
    },

    #[error("Forbidden: {role} {actor_id} may not {transition} {family} {id}")]
    Forbidden {
        family: EntityFamily,
        id: EntityId,
        role: Role,
        actor_id: String,
        transition: String,
    },

    #[error("Forbidden: {role} {actor_id} may not submit a {family}")]
    SubmissionForbidden {
        family: EntityFamily,
        role: Role,
        actor_id: String,
    },

    #[error("Transition {transition} requires a reason")]
    MissingReason { transition: String },

    #[error("Conflicting transition on {family} {id}: expected version {expected}, found {actual}")]
    ConflictingTransition {
        family: EntityFamily,
        id: EntityId,
        expected: u64,
        actual: u64,
    },

    #[error("Precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl LifecycleError {
    /// Stable machine-readable code for callers building user-facing messages
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Forbidden { .. } | Self::SubmissionForbidden { .. } => "forbidden",
            Self::MissingReason { .. } => "missing_reason",
            Self::ConflictingTransition { .. } => "conflicting_transition",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::Validation(_) => "validation",
        }
    }
}

/// Specific error type for guard condition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("No price has been set")]
    PriceNotSet,

    #[error("Price must be greater than zero")]
    NonPositivePrice,

    #[error("Quote of {quoted} is below the minimum of {minimum} for task type {task_type}")]
    QuoteBelowMinimum {
        task_type: String,
        quoted: u64,
        minimum: u64,
    },

    #[error("Payment already recorded as {status}")]
    AlreadyPaid { status: String },

    #[error("Payment has not been received and offline payment was not accepted")]
    PaymentNotReceived,

    #[error("Business rule violation: {rule}")]
    BusinessRuleViolation { rule: String },
}

/// Specific error type for post-commit action failures
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Event publishing failed: {event_name}")]
    EventPublishFailed { event_name: String },
}

impl From<GuardError> for LifecycleError {
    fn from(err: GuardError) -> Self {
        Self::PreconditionFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
pub type GuardResult<T> = Result<T, GuardError>;
pub type ActionResult<T> = Result<T, ActionError>;

/// Helper function to create business rule violations
pub fn business_rule_violation(rule: impl Into<String>) -> GuardError {
    GuardError::BusinessRuleViolation { rule: rule.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_guard_error_becomes_precondition_failed() {
        let err: LifecycleError = GuardError::PriceNotSet.into();
        assert_eq!(
            err,
            LifecycleError::PreconditionFailed {
                reason: "No price has been set".to_string()
            }
        );
        assert_eq!(err.code(), "precondition_failed");
    }

    #[test]
    fn test_error_messages() {
        let id = Uuid::nil();
        let err = LifecycleError::ConflictingTransition {
            family: EntityFamily::Task,
            id,
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            format!("Conflicting transition on task {id}: expected version 3, found 4")
        );

        let err = business_rule_violation("Only live-pool tasks can be claimed");
        assert_eq!(
            err.to_string(),
            "Business rule violation: Only live-pool tasks can be claimed"
        );
    }
}

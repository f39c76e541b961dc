use thiserror::Error;

use crate::models::EntityId;
use crate::state_machine::{EntityFamily, LifecycleError};

/// Failures raised by the entity store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{family} {id} not found")]
    NotFound { family: EntityFamily, id: EntityId },

    #[error("{family} {id} already exists")]
    DuplicateId { family: EntityFamily, id: EntityId },

    #[error("Version conflict on {family} {id}: expected {expected}, found {actual}")]
    VersionConflict {
        family: EntityFamily,
        id: EntityId,
        expected: u64,
        actual: u64,
    },

    #[error("Status conflict on {family} {id} at version {version}: expected {expected}, found {actual}")]
    StatusConflict {
        family: EntityFamily,
        id: EntityId,
        version: u64,
        expected: String,
        actual: String,
    },

    #[error("VA {va_id} already holds {active} active tasks (limit {limit})")]
    WorkloadExceeded { va_id: String, active: u32, limit: u32 },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound { family, id } => LifecycleError::NotFound { family, id },
            StoreError::VersionConflict {
                family,
                id,
                expected,
                actual,
            } => LifecycleError::ConflictingTransition {
                family,
                id,
                expected,
                actual,
            },
            StoreError::StatusConflict {
                family, id, version, ..
            } => LifecycleError::ConflictingTransition {
                family,
                id,
                expected: version,
                actual: version,
            },
            StoreError::WorkloadExceeded { .. } => {
                LifecycleError::PreconditionFailed { reason: message }
            }
            StoreError::DuplicateId { .. } => LifecycleError::Validation(message),
        }
    }
}

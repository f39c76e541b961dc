//! Crate-level error type aggregating the errors of each layer.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::events::PublishError;
use crate::state_machine::LifecycleError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum StipsError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Event error: {0}")]
    Event(#[from] PublishError),
}

impl StipsError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lifecycle(err) => err.code(),
            Self::Store(_) => "store",
            Self::Configuration(_) => "configuration",
            Self::Event(_) => "event",
        }
    }
}

pub type Result<T> = std::result::Result<T, StipsError>;

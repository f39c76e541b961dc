//! # Engine Configuration
//!
//! Settings for the lifecycle engine, loaded through the `config` crate.
//!
//! ## Sources
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults ([`EngineConfig::default`])
//! 2. `stips.toml` in the configuration directory
//! 3. `stips.<environment>.toml` in the configuration directory
//! 4. `STIPS__*` environment variables (`STIPS__MAX_ACTIVE_TASKS_PER_VA=8`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stips_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let cap = manager.config().max_active_tasks_per_va;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Pricing and availability of one task type, as maintained by admins
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskTypeSettings {
    pub name: String,
    /// Smallest quote accepted for this type, in minor currency units
    #[serde(default)]
    pub min_price_minor: u64,
    /// Per-page floor; the effective minimum is the larger of the two
    #[serde(default)]
    pub price_per_page_minor: u64,
}

impl TaskTypeSettings {
    pub fn new(name: impl Into<String>, min_price_minor: u64, price_per_page_minor: u64) -> Self {
        Self {
            name: name.into(),
            min_price_minor,
            price_per_page_minor,
        }
    }
}

/// Root configuration for the lifecycle engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Active tasks a single VA may hold at once
    pub max_active_tasks_per_va: u32,

    /// Capacity of the broadcast channel feeding lifecycle subscribers
    pub notification_channel_capacity: usize,

    /// Events retained by the in-memory activity log
    pub activity_log_capacity: usize,

    /// Minimum length of a justification after trimming whitespace
    pub min_reason_length: usize,

    /// Task types students may submit; empty means unrestricted
    pub task_types: Vec<TaskTypeSettings>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_active_tasks_per_va: 5,
            notification_channel_capacity: 1024,
            activity_log_capacity: 10_000,
            min_reason_length: 1,
            task_types: vec![
                TaskTypeSettings::new("assignment", 1_000, 0),
                TaskTypeSettings::new("project", 5_000, 0),
                TaskTypeSettings::new("thesis", 20_000, 0),
                TaskTypeSettings::new("typing", 500, 100),
                TaskTypeSettings::new("business", 5_000, 0),
            ],
        }
    }
}

impl EngineConfig {
    /// Validate loaded values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_active_tasks_per_va == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_active_tasks_per_va",
                "must be greater than zero",
            ));
        }

        if self.notification_channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "notification_channel_capacity",
                "must be greater than zero",
            ));
        }

        if self.min_reason_length == 0 {
            return Err(ConfigurationError::invalid_value(
                "min_reason_length",
                "must be at least 1 so that blank reasons are rejected",
            ));
        }

        let mut seen = HashSet::new();
        for task_type in &self.task_types {
            let name = task_type.name.trim();
            if name.is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "task_types.name",
                    "task type names cannot be blank",
                ));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigurationError::invalid_value(
                    "task_types.name",
                    format!("duplicate task type '{name}'"),
                ));
            }
        }

        Ok(())
    }
}

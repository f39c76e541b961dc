//! Admin-maintained marketplace settings consulted by the lifecycle engine.
//!
//! The engine only needs two answers from settings: whether a task type may be
//! submitted and what the smallest acceptable quote for a task is. Both come
//! through [`SettingsProvider`] so hosts can back them with whatever store
//! their admin tooling writes to.

use std::collections::HashMap;

use crate::config::{EngineConfig, TaskTypeSettings};

pub trait SettingsProvider: Send + Sync {
    /// Settings for a task type, matched case-insensitively
    fn task_type(&self, name: &str) -> Option<TaskTypeSettings>;

    /// Whether students may submit tasks of this type
    fn is_allowed(&self, name: &str) -> bool;

    /// Smallest quote a VA may send for a task, in minor units.
    ///
    /// The larger of the type's flat minimum and its per-page rate times the
    /// page count. Unknown types have no minimum.
    fn minimum_quote_minor(&self, task_type: &str, page_count: u32) -> u64 {
        self.task_type(task_type)
            .map(|settings| {
                let per_page = settings
                    .price_per_page_minor
                    .saturating_mul(u64::from(page_count));
                settings.min_price_minor.max(per_page)
            })
            .unwrap_or(0)
    }
}

/// Settings fixed at construction, usually taken from [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    task_types: HashMap<String, TaskTypeSettings>,
}

impl StaticSettings {
    /// An empty list leaves task types unrestricted
    pub fn new(task_types: Vec<TaskTypeSettings>) -> Self {
        let task_types = task_types
            .into_iter()
            .map(|settings| (normalize(&settings.name), settings))
            .collect();
        Self { task_types }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.task_types.clone())
    }

    pub fn task_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.task_types.values().map(|s| s.name.clone()).collect();
        names.sort();
        names
    }
}

impl SettingsProvider for StaticSettings {
    fn task_type(&self, name: &str) -> Option<TaskTypeSettings> {
        self.task_types.get(&normalize(name)).cloned()
    }

    fn is_allowed(&self, name: &str) -> bool {
        !name.trim().is_empty()
            && (self.task_types.is_empty() || self.task_types.contains_key(&normalize(name)))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

//! Per-family record storage.
//!
//! Each entity lives in a [`DashMap`] shard together with its transition
//! history. A commit holds the shard's write guard from the compare step until
//! the history append, so two writers can never both see the same version.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use crate::models::{EntityId, Role};
use crate::state_machine::{LifecycleEntity, LifecycleState};

/// Status and version a writer read before deciding on a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected<S> {
    pub status: S,
    pub version: u64,
}

impl<S> Expected<S> {
    pub fn new(status: S, version: u64) -> Self {
        Self { status, version }
    }
}

/// Who made a change and why, as handed to the store by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
    pub transition: String,
    pub actor_id: String,
    pub acting_role: Role,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// One committed change in an entity's audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Position in the entity's history, starting at 0 for creation
    pub sort_key: u32,
    pub most_recent: bool,
    pub from_status: Option<String>,
    pub to_status: String,
    pub transition: String,
    pub actor_id: String,
    pub acting_role: Role,
    pub reason: Option<String>,
    /// Entity version produced by this change
    pub version: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredRecord<E> {
    entity: E,
    history: Vec<TransitionRecord>,
}

impl<E> StoredRecord<E> {
    fn append(&mut self, mut record: TransitionRecord) {
        if let Some(previous) = self.history.last_mut() {
            previous.most_recent = false;
        }
        record.sort_key = self.history.len() as u32;
        record.most_recent = true;
        self.history.push(record);
    }
}

/// Records of one entity family keyed by id
#[derive(Debug)]
pub struct Collection<E: LifecycleEntity> {
    records: DashMap<EntityId, StoredRecord<E>>,
}

impl<E: LifecycleEntity> Default for Collection<E> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<E: LifecycleEntity> Collection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly created entity and its creation record.
    pub fn insert(&self, entity: E, change: ChangeContext) -> StoreResult<E> {
        let id = entity.id();
        match self.records.entry(id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId {
                family: <E::Status as LifecycleState>::FAMILY,
                id,
            }),
            Entry::Vacant(slot) => {
                let mut record = StoredRecord {
                    entity: entity.clone(),
                    history: Vec::new(),
                };
                record.append(TransitionRecord {
                    sort_key: 0,
                    most_recent: true,
                    from_status: None,
                    to_status: entity.status().to_string(),
                    transition: change.transition,
                    actor_id: change.actor_id,
                    acting_role: change.acting_role,
                    reason: change.reason,
                    version: entity.version(),
                    recorded_at: change.at,
                });
                slot.insert(record);
                Ok(entity)
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<E> {
        self.records.get(&id).map(|record| record.entity.clone())
    }

    pub fn history(&self, id: EntityId) -> Option<Vec<TransitionRecord>> {
        self.records.get(&id).map(|record| record.history.clone())
    }

    /// Replace the entity with `next` if it still matches `expected`.
    ///
    /// `next` carries the target status and every side effect; the store assigns
    /// the new version and timestamps. `before_commit` runs under the same lock
    /// after the comparison succeeds; if it fails nothing is written.
    pub fn compare_and_swap<F>(
        &self,
        id: EntityId,
        expected: Expected<E::Status>,
        next: E,
        change: ChangeContext,
        before_commit: F,
    ) -> StoreResult<E>
    where
        F: FnOnce(&E, &E) -> StoreResult<()>,
    {
        let family = <E::Status as LifecycleState>::FAMILY;
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::NotFound { family, id })?;

        let current_version = record.entity.version();
        if current_version != expected.version {
            return Err(StoreError::VersionConflict {
                family,
                id,
                expected: expected.version,
                actual: current_version,
            });
        }

        let current_status = record.entity.status();
        if current_status != expected.status {
            return Err(StoreError::StatusConflict {
                family,
                id,
                version: current_version,
                expected: expected.status.to_string(),
                actual: current_status.to_string(),
            });
        }

        before_commit(&record.entity, &next)?;

        let mut next = next;
        let version = current_version + 1;
        let status = next.status();
        next.stamp(status, version, change.at);

        record.append(TransitionRecord {
            sort_key: 0,
            most_recent: true,
            from_status: Some(current_status.to_string()),
            to_status: status.to_string(),
            transition: change.transition,
            actor_id: change.actor_id,
            acting_role: change.acting_role,
            reason: change.reason,
            version,
            recorded_at: change.at,
        });
        record.entity = next.clone();

        Ok(next)
    }

    /// Entities matching `predicate`, ordered by creation time then id.
    pub fn select<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        let mut selected: Vec<E> = self
            .records
            .iter()
            .filter(|record| predicate(&record.entity))
            .map(|record| record.entity.clone())
            .collect();
        selected.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        selected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! # Lifecycle Engine
//!
//! Validates and applies transitions on tasks and print jobs.
//!
//! Every request runs the same pipeline:
//!
//! 1. Load the entity and compare the caller's expected version
//! 2. Resolve the requested transition against the status registry
//! 3. Authorize the actor against the edge's permissions
//! 4. Require a justification where the edge demands one
//! 5. Run the transition's guards
//! 6. Apply side effects to a working copy and commit it with compare-and-swap
//! 7. Publish the lifecycle event (best-effort, never rolls back)
//!
//! Family-specific entry points live in [`task_lifecycle`] and
//! [`print_job_lifecycle`]; read access lives in [`queries`].

pub mod payment;
pub mod print_job_lifecycle;
pub mod queries;
pub mod task_lifecycle;

use std::sync::Arc;

use chrono::Utc;

use crate::config::EngineConfig;
use crate::events::{LifecycleEvent, NotificationDispatcher};
use crate::logging;
use crate::models::{Actor, EntityId};
use crate::settings::{SettingsProvider, StaticSettings};
use crate::state_machine::actions::{
    PublishTransitionEventAction, StateAction, TerminalStateLogAction,
};
use crate::state_machine::{
    authorize, GuardContext, LifecycleError, LifecycleResult, LifecycleState, LifecycleTransition,
    StatusRegistry,
};
use crate::store::{ChangeContext, EntityStore, Expected, StoredEntity};

pub use payment::{
    EnginePaymentCallback, PaymentCallback, PaymentConfirmation, PaymentReceipt, PaymentTarget,
};
pub use print_job_lifecycle::PrintJobTransitionRequest;
pub use task_lifecycle::TaskTransitionRequest;

pub struct LifecycleEngine {
    store: Arc<EntityStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    settings: Arc<dyn SettingsProvider>,
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<EntityStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        settings: Arc<dyn SettingsProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            settings,
            config,
        }
    }

    /// Build an engine with a fresh store and settings taken from `config`.
    ///
    /// The dispatcher is built by the caller, typically through
    /// `BroadcastDispatcher::from_config` and `ActivityLog::from_config`.
    pub fn from_config(config: EngineConfig, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        let store = Arc::new(EntityStore::new(config.max_active_tasks_per_va));
        let settings = Arc::new(StaticSettings::from_config(&config));
        Self::new(store, dispatcher, settings, config)
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn settings(&self) -> &dyn SettingsProvider {
        self.settings.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the transition pipeline for one entity.
    ///
    /// `expected_version` of `None` skips the caller-side version check; the
    /// store commit still compares against the version read here.
    pub(crate) fn execute<E>(
        &self,
        id: EntityId,
        expected_version: Option<u64>,
        actor: &Actor,
        transition: E::Transition,
    ) -> LifecycleResult<E>
    where
        E: StoredEntity,
        TerminalStateLogAction: StateAction<E>,
    {
        let kind = transition.kind();
        match self.try_execute::<E>(id, expected_version, actor, &transition) {
            Ok((entity, event)) => {
                self.after_commit(&entity, &event);
                Ok(entity)
            }
            Err(err) => {
                logging::log_rejection(
                    <E::Status as LifecycleState>::FAMILY.as_str(),
                    &id.to_string(),
                    &kind.to_string(),
                    &actor.id,
                    err.code(),
                    &err.to_string(),
                );
                Err(err)
            }
        }
    }

    fn try_execute<E: StoredEntity>(
        &self,
        id: EntityId,
        expected_version: Option<u64>,
        actor: &Actor,
        transition: &E::Transition,
    ) -> LifecycleResult<(E, LifecycleEvent)> {
        let family = <E::Status as LifecycleState>::FAMILY;
        let current: E = self.store.get(id)?;

        if let Some(expected) = expected_version {
            if expected != current.version() {
                return Err(LifecycleError::ConflictingTransition {
                    family,
                    id,
                    expected,
                    actual: current.version(),
                });
            }
        }

        let kind = transition.kind();
        let from = current.status();
        let rule = StatusRegistry::resolve(from, kind).ok_or_else(|| {
            LifecycleError::InvalidTransition {
                family,
                id,
                from: from.to_string(),
                transition: kind.to_string(),
            }
        })?;

        if !authorize(actor, rule.permitted, &current.ownership()) {
            return Err(LifecycleError::Forbidden {
                family,
                id,
                role: actor.role,
                actor_id: actor.id.clone(),
                transition: kind.to_string(),
            });
        }

        if rule.requires_reason {
            self.require_reason(&kind.to_string(), transition.reason())?;
        }

        let ctx = GuardContext {
            settings: self.settings.as_ref(),
        };
        current.check_guards(transition, &ctx)?;

        let now = Utc::now();
        let mut next = current.clone();
        next.apply_effects(transition, actor);
        next.stamp(rule.to, current.version(), now);
        let workload = next.workload_delta(&current);

        let reason = transition.reason().map(|r| r.trim().to_string());
        let change = ChangeContext {
            transition: kind.to_string(),
            actor_id: actor.id.clone(),
            acting_role: actor.role,
            reason: reason.clone(),
            at: now,
        };
        let committed = self.store.commit(
            id,
            Expected::new(from, current.version()),
            next,
            change,
            workload,
        )?;

        logging::log_transition(
            family.as_str(),
            &id.to_string(),
            &kind.to_string(),
            &from.to_string(),
            &rule.to.to_string(),
            &actor.id,
            committed.version(),
        );

        let event = LifecycleEvent {
            entity_type: family,
            entity_id: id,
            event_name: rule.event_name.to_string(),
            from_status: from.to_string(),
            to_status: rule.to.to_string(),
            acting_role: actor.role,
            actor_id: actor.id.clone(),
            version: committed.version(),
            reason,
            timestamp: now,
        };

        Ok((committed, event))
    }

    /// Reject blank or too-short justifications
    fn require_reason(&self, transition: &str, reason: Option<&str>) -> LifecycleResult<()> {
        let length = reason.map(|r| r.trim().chars().count()).unwrap_or(0);
        if length < self.config.min_reason_length.max(1) {
            return Err(LifecycleError::MissingReason {
                transition: transition.to_string(),
            });
        }
        Ok(())
    }

    /// Post-commit actions. Failures are logged; the commit stands.
    fn after_commit<E>(&self, entity: &E, event: &LifecycleEvent)
    where
        E: StoredEntity,
        TerminalStateLogAction: StateAction<E>,
    {
        let actions: Vec<Box<dyn StateAction<E>>> = vec![
            Box::new(PublishTransitionEventAction::new(self.dispatcher.clone())),
            Box::new(TerminalStateLogAction),
        ];

        for action in actions {
            if let Err(e) = action.execute(entity, event) {
                logging::log_dispatch_failure(
                    &event.event_name,
                    &event.entity_id.to_string(),
                    &format!("{} failed: {e}", action.description()),
                );
            }
        }
    }

    /// Publish an event that is not tied to a registry edge
    fn publish(&self, event: &LifecycleEvent) {
        if let Err(e) = self.dispatcher.publish(event) {
            logging::log_dispatch_failure(&event.event_name, &event.entity_id.to_string(), &e.to_string());
        }
    }
}

impl std::fmt::Debug for LifecycleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleEngine")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

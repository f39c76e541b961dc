//! Payment processor boundary.
//!
//! Payment providers report back asynchronously; [`PaymentCallback`] is the
//! seam they call. [`EnginePaymentCallback`] checks the confirmed amount
//! against the quoted price and then drives the synchronous engine.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::LifecycleEngine;
use crate::models::EntityId;
use crate::state_machine::{LifecycleError, LifecycleResult};

/// Entity a payment was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PaymentTarget {
    Task(EntityId),
    PrintJob(EntityId),
}

/// Notification from a payment provider that money was received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub target: PaymentTarget,
    pub payment_reference: String,
    /// Amount received, in minor currency units
    pub amount_minor: u64,
}

/// Outcome reported back to the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub target: PaymentTarget,
    pub payment_reference: String,
    /// Entity version after the payment was applied
    pub version: u64,
}

#[async_trait]
pub trait PaymentCallback: Send + Sync {
    async fn on_payment_confirmed(
        &self,
        confirmation: PaymentConfirmation,
    ) -> LifecycleResult<PaymentReceipt>;
}

/// Applies provider confirmations to the lifecycle engine
#[derive(Debug, Clone)]
pub struct EnginePaymentCallback {
    engine: Arc<LifecycleEngine>,
}

impl EnginePaymentCallback {
    pub fn new(engine: Arc<LifecycleEngine>) -> Self {
        Self { engine }
    }

    fn check_amount(quoted: Option<u64>, confirmation: &PaymentConfirmation) -> LifecycleResult<()> {
        match quoted {
            Some(price) if price == confirmation.amount_minor => Ok(()),
            Some(price) => Err(LifecycleError::PreconditionFailed {
                reason: format!(
                    "Payment {} of {} does not match quoted price {}",
                    confirmation.payment_reference, confirmation.amount_minor, price
                ),
            }),
            None => Err(LifecycleError::PreconditionFailed {
                reason: "No price has been set".to_string(),
            }),
        }
    }
}

#[async_trait]
impl PaymentCallback for EnginePaymentCallback {
    async fn on_payment_confirmed(
        &self,
        confirmation: PaymentConfirmation,
    ) -> LifecycleResult<PaymentReceipt> {
        let result = match confirmation.target {
            PaymentTarget::Task(task_id) => {
                let task = self.engine.get_task(task_id)?;
                Self::check_amount(task.price_minor, &confirmation).and_then(|()| {
                    self.engine
                        .confirm_payment(task_id, &confirmation.payment_reference)
                        .map(|task| task.version)
                })
            }
            PaymentTarget::PrintJob(job_id) => {
                let job = self.engine.get_print_job(job_id)?;
                Self::check_amount(job.price_minor, &confirmation).and_then(|()| {
                    self.engine
                        .confirm_print_payment(job_id, &confirmation.payment_reference)
                        .map(|job| job.version)
                })
            }
        };

        match result {
            Ok(version) => {
                info!(
                    target_entity = ?confirmation.target,
                    payment_reference = %confirmation.payment_reference,
                    amount_minor = confirmation.amount_minor,
                    "Payment confirmation applied"
                );
                Ok(PaymentReceipt {
                    target: confirmation.target,
                    payment_reference: confirmation.payment_reference,
                    version,
                })
            }
            Err(e) => {
                warn!(
                    target_entity = ?confirmation.target,
                    payment_reference = %confirmation.payment_reference,
                    error = %e,
                    "Payment confirmation refused"
                );
                Err(e)
            }
        }
    }
}

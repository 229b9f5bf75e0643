//! Delivery channel abstraction.
//!
//! Real deployments call an external messaging vendor and map its response;
//! this core ships a stochastic stub. Tests inject a deterministic channel
//! through the same trait.

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crm_core::{CustomerProfile, DeliveryStatus};

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

impl From<DeliveryOutcome> for DeliveryStatus {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Sent => DeliveryStatus::Sent,
            DeliveryOutcome::Failed => DeliveryStatus::Failed,
        }
    }
}

/// A channel that attempts delivery of one personalized message.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, recipient: &CustomerProfile, message: &str) -> DeliveryOutcome;
}

/// Default success probability of the simulated vendor.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Simulated vendor: a weighted random draw decides each delivery.
pub struct VendorStub {
    success_rate: f64,
}

impl VendorStub {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for VendorStub {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE)
    }
}

#[async_trait]
impl DeliveryChannel for VendorStub {
    async fn deliver(&self, recipient: &CustomerProfile, _message: &str) -> DeliveryOutcome {
        let delivered = rand::thread_rng().gen_bool(self.success_rate);
        debug!(
            customer_id = %recipient.id,
            delivered = delivered,
            "Simulated vendor delivery"
        );
        if delivered {
            DeliveryOutcome::Sent
        } else {
            DeliveryOutcome::Failed
        }
    }
}

//! Mock implementations for testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crm_core::CustomerProfile;
use worker::{DeliveryChannel, DeliveryOutcome};

/// Deterministic delivery channel.
///
/// Implements the same `DeliveryChannel` trait as the stochastic vendor
/// stub, so the campaign worker runs its real code path while tests control
/// every outcome. Outcomes are served from a script (front first); when the
/// script runs dry the default outcome applies.
pub struct ScriptedChannel {
    script: Mutex<VecDeque<DeliveryOutcome>>,
    default: Mutex<DeliveryOutcome>,
    delivered: Mutex<Vec<(String, String)>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new(DeliveryOutcome::Sent),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Queue up outcomes for the next deliveries, in order.
    pub fn push_outcomes(&self, outcomes: impl IntoIterator<Item = DeliveryOutcome>) {
        self.script.lock().extend(outcomes);
    }

    /// Outcome used once the script is exhausted.
    pub fn set_default(&self, outcome: DeliveryOutcome) {
        *self.default.lock() = outcome;
    }

    /// Every (customer_id, message) pair delivered through this channel.
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().len()
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedChannel {
    async fn deliver(&self, recipient: &CustomerProfile, message: &str) -> DeliveryOutcome {
        self.delivered
            .lock()
            .push((recipient.id.clone(), message.to_string()));
        self.script
            .lock()
            .pop_front()
            .unwrap_or(*self.default.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> CustomerProfile {
        CustomerProfile {
            id: id.into(),
            name: "A".into(),
            email: "a@x.com".into(),
        }
    }

    #[tokio::test]
    async fn test_scripted_channel_follows_script_then_default() {
        let channel = ScriptedChannel::new();
        channel.push_outcomes([DeliveryOutcome::Failed]);

        assert_eq!(
            channel.deliver(&profile("u1"), "Hi A").await,
            DeliveryOutcome::Failed
        );
        assert_eq!(
            channel.deliver(&profile("u2"), "Hi A").await,
            DeliveryOutcome::Sent
        );
        assert_eq!(channel.delivery_count(), 2);
    }
}

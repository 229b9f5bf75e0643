//! Queue configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by every queue a broker creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Number of failed-job records retained per queue for supervision.
    #[serde(default = "default_failure_log_size")]
    pub failure_log_size: usize,
}

fn default_failure_log_size() -> usize {
    64
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            failure_log_size: default_failure_log_size(),
        }
    }
}

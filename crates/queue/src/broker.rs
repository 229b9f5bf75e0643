//! Broker owning the named queues.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crm_core::Result;

use crate::config::QueueConfig;
use crate::job::{JobId, JobSpec};
use crate::queue::{JobQueue, QueueStats};

/// Queue names used by the pipeline.
pub mod queues {
    pub const CUSTOMER: &str = "customer";
    pub const ORDER: &str = "order";
    pub const CAMPAIGN: &str = "campaign";

    /// All pipeline queues, for initialization and stats reporting.
    pub const ALL: &[&str] = &[CUSTOMER, ORDER, CAMPAIGN];
}

/// Job names understood by the workers.
pub mod jobs {
    pub const PERSIST_BATCH: &str = "persistent-batch";
    pub const PERSIST_ORDER_BATCH: &str = "persistent-order-batch";
    pub const PROCESS_CAMPAIGN: &str = "process-campaign";
}

/// Registry of named queues with a shared configuration.
///
/// Constructed once at process start and injected wherever jobs are
/// produced or consumed; queues are created on first use.
pub struct JobBroker {
    config: QueueConfig,
    queues: RwLock<HashMap<String, Arc<JobQueue>>>,
    closed: std::sync::atomic::AtomicBool,
}

impl JobBroker {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            queues: RwLock::new(HashMap::new()),
            closed: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Gets or creates the queue with the given name. Queues created after
    /// the broker is closed start closed.
    pub fn queue(&self, name: &str) -> Arc<JobQueue> {
        if let Some(queue) = self.queues.read().get(name) {
            return queue.clone();
        }

        let mut queues = self.queues.write();
        queues
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(queue = name, "Created queue");
                let queue = JobQueue::new(name, self.config.clone());
                if self.closed.load(std::sync::atomic::Ordering::SeqCst) {
                    queue.close();
                }
                Arc::new(queue)
            })
            .clone()
    }

    /// Enqueues one job on the named queue.
    pub fn enqueue(
        &self,
        queue_name: &str,
        job_name: &str,
        payload: serde_json::Value,
    ) -> Result<JobId> {
        self.queue(queue_name)
            .enqueue(JobSpec::new(job_name, payload))
    }

    /// Enqueues a batch of jobs on the named queue as one submission.
    pub fn enqueue_bulk(&self, queue_name: &str, specs: Vec<JobSpec>) -> Result<Vec<JobId>> {
        self.queue(queue_name).enqueue_bulk(specs)
    }

    /// Stops all queues from accepting new submissions.
    pub fn close_all(&self) {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
        for queue in self.queues.read().values() {
            queue.close();
        }
        info!("All queues closed");
    }

    /// Stats for every queue that has been created.
    pub fn stats(&self) -> Vec<QueueStats> {
        let mut stats: Vec<QueueStats> = self
            .queues
            .read()
            .values()
            .map(|queue| queue.stats())
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }
}

impl Default for JobBroker {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

//! Worker supervisor.
//!
//! Binds one consumer per queue at concurrency 1: a single in-flight job per
//! queue keeps each batch transaction serialized against the entities it
//! touches. On shutdown the in-flight job finishes or aborts on its own;
//! nothing is killed mid-transaction.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crm_core::Result;
use queue::{queues, Job, JobBroker, JobQueue};
use store::Store;
use telemetry::metrics;

use crate::campaign::{CampaignWorker, CampaignWorkerConfig};
use crate::customer::CustomerWorker;
use crate::delivery::DeliveryChannel;
use crate::order::OrderWorker;

/// A worker bound to one queue.
#[async_trait]
pub trait JobProcessor: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Processes one job. An `Err` marks the job failed; no-op outcomes
    /// (malformed batch, missing entities) return `Ok`.
    async fn process(&self, job: &Job) -> Result<()>;
}

/// Supervisor configuration.
#[derive(Debug, Clone, Default)]
pub struct SupervisorConfig {
    pub campaign: CampaignWorkerConfig,
}

/// Owns the worker tasks and their shutdown signal.
pub struct WorkerSupervisor {
    config: SupervisorConfig,
    store: Arc<dyn Store>,
    broker: Arc<JobBroker>,
    channel: Arc<dyn DeliveryChannel>,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSupervisor {
    pub fn new(
        config: SupervisorConfig,
        store: Arc<dyn Store>,
        broker: Arc<JobBroker>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            store,
            broker,
            channel,
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Starts one consumer task per pipeline queue.
    pub fn start(&mut self) {
        self.spawn(queues::CUSTOMER, CustomerWorker::new(self.store.clone()));
        self.spawn(queues::ORDER, OrderWorker::new(self.store.clone()));
        self.spawn(
            queues::CAMPAIGN,
            CampaignWorker::new(
                self.store.clone(),
                self.channel.clone(),
                self.config.campaign.clone(),
            ),
        );
        info!("Workers started");
    }

    fn spawn(&mut self, queue_name: &str, processor: impl JobProcessor) {
        let queue = self.broker.queue(queue_name);
        let shutdown = self.shutdown.subscribe();
        self.handles
            .push(tokio::spawn(consume(queue, processor, shutdown)));
    }

    /// Signals all workers and waits for them to finish their in-flight job
    /// and exit.
    pub async fn shutdown(mut self) {
        info!("Stopping workers; in-flight jobs are allowed to finish");
        let _ = self.shutdown.send(true);
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Worker task panicked: {e}");
            }
        }
        info!("Workers stopped");
    }
}

/// Consumer loop: one job at a time. The shutdown signal is only observed
/// between jobs, so a job that is already processing runs to completion.
pub async fn consume(
    queue: Arc<JobQueue>,
    processor: impl JobProcessor,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(queue = queue.name(), worker = processor.name(), "Worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            job = queue.dequeue() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let start = Instant::now();
        match processor.process(&job).await {
            Ok(()) => queue.complete(&job),
            Err(e) => queue.fail(&job, &e.to_string()),
        }
        metrics().job_latency_ms.observe(start.elapsed().as_millis() as u64);
    }

    info!(queue = queue.name(), worker = processor.name(), "Worker stopped");
}

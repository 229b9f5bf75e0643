//! A single named queue with one consumer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

use crm_core::{Error, Result};
use telemetry::metrics;

use crate::config::QueueConfig;
use crate::job::{FailedJob, Job, JobId, JobSpec};

/// Point-in-time accounting for one queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    pub name: String,
    pub depth: usize,
    pub enqueued: u64,
    pub completed: u64,
    pub failed: u64,
}

/// A named work queue.
///
/// Jobs are delivered at least once to the single consumer bound to the
/// queue. Completion and failure are reported back by the consumer so the
/// queue can be observed; failed jobs are recorded, never auto-retried.
pub struct JobQueue {
    name: String,
    config: QueueConfig,
    pending: Mutex<VecDeque<Job>>,
    notify: Notify,
    closed: AtomicBool,
    enqueued: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    failures: Mutex<VecDeque<FailedJob>>,
}

impl JobQueue {
    pub fn new(name: impl Into<String>, config: QueueConfig) -> Self {
        Self {
            name: name.into(),
            config,
            pending: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            enqueued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues one job. Fails when the queue no longer accepts submissions.
    pub fn enqueue(&self, spec: JobSpec) -> Result<JobId> {
        let ids = self.enqueue_bulk(vec![spec])?;
        Ok(ids[0])
    }

    /// Enqueues a batch of jobs as one submission, preserving order.
    pub fn enqueue_bulk(&self, specs: Vec<JobSpec>) -> Result<Vec<JobId>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::queue_unavailable(format!(
                "queue {} is closed",
                self.name
            )));
        }

        let count = specs.len();
        let mut ids = Vec::with_capacity(count);
        {
            let mut pending = self.pending.lock();
            for spec in specs {
                let job = Job {
                    id: Uuid::new_v4(),
                    queue: self.name.clone(),
                    name: spec.name,
                    payload: spec.payload,
                    enqueued_at: Utc::now(),
                };
                ids.push(job.id);
                pending.push_back(job);
            }
        }

        self.enqueued.fetch_add(count as u64, Ordering::Relaxed);
        metrics().jobs_enqueued.inc_by(count as u64);
        metrics().queue_depth.inc_by(count as u64);
        self.notify.notify_one();

        debug!(queue = %self.name, count = count, "Enqueued jobs");
        Ok(ids)
    }

    /// Waits for the next job. Returns `None` once the queue is closed and
    /// drained, so the consumer loop can exit.
    pub async fn dequeue(&self) -> Option<Job> {
        loop {
            // Register interest before checking, so a concurrent enqueue
            // between the check and the await cannot be missed.
            let notified = self.notify.notified();

            if let Some(job) = self.pending.lock().pop_front() {
                metrics().queue_depth.dec();
                return Some(job);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }

            notified.await;
        }
    }

    /// Marks a dequeued job as successfully processed.
    pub fn complete(&self, job: &Job) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        metrics().jobs_completed.inc();
        debug!(queue = %self.name, job_id = %job.id, job_name = %job.name, "Job completed");
    }

    /// Marks a dequeued job as failed and records the failure for
    /// supervision. The job is not requeued.
    pub fn fail(&self, job: &Job, error: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        metrics().jobs_failed.inc();

        let mut failures = self.failures.lock();
        if failures.len() == self.config.failure_log_size {
            failures.pop_front();
        }
        failures.push_back(FailedJob {
            job_id: job.id,
            name: job.name.clone(),
            error: error.to_string(),
            failed_at: Utc::now(),
        });

        warn!(
            queue = %self.name,
            job_id = %job.id,
            job_name = %job.name,
            error = %error,
            "Job failed"
        );
    }

    /// Stops accepting submissions and wakes the consumer so it can drain
    /// what is already pending and exit.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn depth(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            name: self.name.clone(),
            depth: self.depth(),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Recent failures, oldest first.
    pub fn failures(&self) -> Vec<FailedJob> {
        self.failures.lock().iter().cloned().collect()
    }
}

//! Job types carried through the queues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to a job at enqueue time.
pub type JobId = Uuid;

/// A job submission: a name plus an opaque JSON payload. The payload is not
/// inspected until a worker bound to the queue dequeues it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    pub payload: serde_json::Value,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// A dequeued job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub queue: String,
    pub name: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

/// Record of a job that failed processing, kept for supervision/alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedJob {
    pub job_id: JobId,
    pub name: String,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

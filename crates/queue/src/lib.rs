//! Durable, named work queues for the campaign engine.
//!
//! Each queue holds ordered batches of work as opaque JSON jobs and feeds a
//! single consumer: at-least-once delivery, ordering guaranteed only within
//! one batch's processing. Failed jobs are recorded for supervision; retry
//! policy is a configuration decision layered on top, not built in here.

pub mod broker;
pub mod config;
pub mod job;
pub mod queue;

pub use broker::{jobs, queues, JobBroker};
pub use config::QueueConfig;
pub use job::{FailedJob, Job, JobId, JobSpec};
pub use queue::{JobQueue, QueueStats};

//! Common test setup.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use api::{router, AppState};
use queue::JobBroker;
use store::MemoryStore;
use telemetry::health;
use worker::{SupervisorConfig, WorkerSupervisor};

use crate::mocks::ScriptedChannel;

/// Test context wiring the real router, broker, and workers over the
/// in-memory store, with a deterministic delivery channel.
///
/// This exercises the production code paths end to end: HTTP submission →
/// queue → worker → store, minus only the real network and the stochastic
/// vendor.
pub struct TestContext {
    pub store: MemoryStore,
    pub broker: Arc<JobBroker>,
    pub channel: Arc<ScriptedChannel>,
    pub router: Router,
    supervisor: Option<WorkerSupervisor>,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let broker = Arc::new(JobBroker::default());
        let channel = Arc::new(ScriptedChannel::new());

        let mut supervisor = WorkerSupervisor::new(
            SupervisorConfig::default(),
            Arc::new(store.clone()),
            broker.clone(),
            channel.clone(),
        );
        supervisor.start();

        health().queue.set_healthy();
        health().store.set_healthy();

        let state = AppState::new(broker.clone(), Arc::new(store.clone()));
        let router = router(state);

        Self {
            store,
            broker,
            channel,
            router,
            supervisor: Some(supervisor),
        }
    }

    /// Waits until the named queue has settled at least `n` jobs
    /// (completed or failed). Panics after five seconds.
    pub async fn wait_for_jobs(&self, queue_name: &str, n: u64) {
        let queue = self.broker.queue(queue_name);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stats = queue.stats();
            if stats.completed + stats.failed >= n {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "timed out waiting for {n} settled jobs on '{}': {stats:?}",
                    queue_name
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Closes the queues and waits for the workers to drain and stop.
    pub async fn shutdown(mut self) {
        self.broker.close_all();
        if let Some(supervisor) = self.supervisor.take() {
            supervisor.shutdown().await;
        }
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use queue::JobBroker;
use store::Store;

/// Shared application state.
///
/// Both handles are constructed at process start and injected here; the
/// handlers never reach for ambient singletons.
#[derive(Clone)]
pub struct AppState {
    /// Job broker feeding the worker queues.
    pub broker: Arc<JobBroker>,
    /// Data store (relational in production, in-memory in tests).
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(broker: Arc<JobBroker>, store: Arc<dyn Store>) -> Self {
        Self { broker, store }
    }
}

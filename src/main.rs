//! Campaign Engine
//!
//! Queue-backed CRM pipeline handling:
//! - Bulk customer/order ingestion with idempotent batch upserts
//! - Campaign delivery fan-out with per-recipient communication logs
//! - Delivery-receipt callbacks from the messaging vendor
//! - Worker supervision with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use queue::{queues, JobBroker, QueueConfig};
use store::{MemoryStore, Store};
use telemetry::{health, init_tracing_from_env};
use worker::{CampaignWorkerConfig, SupervisorConfig, VendorStub, WorkerSupervisor};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Success probability of the simulated delivery vendor
    #[serde(default = "default_delivery_success_rate")]
    delivery_success_rate: f64,

    /// Audience batch size for campaign sends
    #[serde(default = "default_send_batch_size")]
    send_batch_size: usize,

    #[serde(default)]
    queue: QueueConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_delivery_success_rate() -> f64 {
    0.9
}

fn default_send_batch_size() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            delivery_success_rate: default_delivery_success_rate(),
            send_batch_size: default_send_batch_size(),
            queue: QueueConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting Campaign Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    info!(
        host = %config.host,
        port = config.port,
        delivery_success_rate = config.delivery_success_rate,
        "Loaded configuration"
    );

    // Initialize the store. The in-memory backend is the reference
    // implementation of the store contract; a relational backend slots in
    // behind the same traits.
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    health().store.set_healthy();

    // Initialize the job broker and the pipeline queues.
    let broker = Arc::new(JobBroker::new(config.queue.clone()));
    for name in queues::ALL {
        broker.queue(name);
    }
    health().queue.set_healthy();

    // Delivery channel: simulated vendor with a configured success rate.
    let channel = Arc::new(VendorStub::new(config.delivery_success_rate));

    // Start the workers, one consumer per queue.
    let mut supervisor = WorkerSupervisor::new(
        SupervisorConfig {
            campaign: CampaignWorkerConfig {
                send_batch_size: config.send_batch_size,
            },
        },
        store.clone(),
        broker.clone(),
        channel,
    );
    supervisor.start();

    // Create application state and router
    let state = AppState::new(broker.clone(), store.clone());
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Cleanup: stop accepting submissions, let in-flight jobs finish.
    info!("Shutting down...");
    broker.close_all();
    supervisor.shutdown().await;

    for stats in broker.stats() {
        info!(
            queue = %stats.name,
            enqueued = stats.enqueued,
            completed = stats.completed,
            failed = stats.failed,
            pending = stats.depth,
            "Final queue stats"
        );
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("CAMPAIGN")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}

//! Internal telemetry for the campaign engine.
//!
//! In-process metrics and health state only; no external metrics backend.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;

//! Background workers for the campaign engine.
//!
//! Handles the async pipeline:
//! - Customer ingestion (batch upsert of customers + addresses)
//! - Order ingestion (referential filtering + batch upsert of orders + items)
//! - Campaign delivery (audience fan-out, send simulation, accounting)
//! - Supervisor (one consumer per queue, graceful shutdown)

pub mod campaign;
pub mod customer;
pub mod delivery;
pub mod order;
pub mod supervisor;

pub use campaign::{vendor_message_id, CampaignWorker, CampaignWorkerConfig};
pub use customer::CustomerWorker;
pub use delivery::{DeliveryChannel, DeliveryOutcome, VendorStub};
pub use order::OrderWorker;
pub use supervisor::{JobProcessor, SupervisorConfig, WorkerSupervisor};

//! Data access for the campaign engine.
//!
//! The workers and the HTTP layer consume the [`Store`] trait only; the
//! relational backend is a deployment concern behind it. Multi-statement
//! units of work go through [`StoreTransaction`] so a batch commits
//! all-or-nothing, with duplicate handling chosen explicitly per write via
//! [`ConflictPolicy`]. The in-memory backend implements the same contract
//! for the default wiring and the test suite.

pub mod conflict;
pub mod interface;
pub mod memory;

pub use conflict::ConflictPolicy;
pub use interface::{DeliveryRecord, Store, StoreTransaction};
pub use memory::{FaultPoint, MemoryStore};

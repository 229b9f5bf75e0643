//! Core types, schemas, and validation for the campaign engine.

pub mod error;
pub mod ingest;
pub mod model;
pub mod template;

pub use error::{Error, Result};
pub use ingest::*;
pub use model::*;
pub use template::MessageTemplate;

//! Domain module
//!
//! Core domain types: the parsed legacy record, the aggregated order
//! model, and the events published when the aggregate changes.

pub mod events;
pub mod model;
pub mod record;

pub use events::OrderEvent;
pub use model::{Order, Product, User};
pub use record::{LegacyRecord, RecordError};

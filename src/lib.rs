//! legacyOrders Library
//!
//! Re-exports modules for integration testing and external use.

pub mod aggregate;
pub mod api;
pub mod broadcast;
pub mod domain;
pub mod hash_store;
pub mod ingest;
pub mod persistence;
pub mod query;

// Private modules (used only by main.rs binary)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{LegacyRecord, Order, OrderEvent, Product, RecordError, User};

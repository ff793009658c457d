//! Domain events
//!
//! Events published by the aggregate and fanned out to live stream
//! subscribers. Each event carries the full current state of the order
//! it concerns.

use serde::{Deserialize, Serialize};

use super::model::Order;

/// Order-related events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    /// An order gained a product (possibly its first).
    OrderUpdated { user_id: i64, order: Order },
}

impl OrderEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderUpdated { .. } => "OrderUpdated",
        }
    }

    /// Get the user ID this event relates to
    pub fn user_id(&self) -> i64 {
        match self {
            OrderEvent::OrderUpdated { user_id, .. } => *user_id,
        }
    }
}

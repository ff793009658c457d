//! Update broadcaster
//!
//! Bounded publish/subscribe channel distributing order-update events to
//! live subscribers. There is no replay: a subscriber only sees events
//! published while it holds a receiver, and dropping the receiver
//! unsubscribes it.

use tokio::sync::broadcast;

use crate::domain::OrderEvent;

/// Events buffered per subscriber before a slow consumer starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Error returned when the subscriber cap is already reached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subscriber limit ({0}) reached")]
pub struct AtCapacity(pub usize);

/// Fan-out channel for order updates.
///
/// The maximum number of concurrent subscribers is a configuration value;
/// `subscribe` refuses new receivers once it is reached.
#[derive(Debug, Clone)]
pub struct OrderBroadcaster {
    tx: broadcast::Sender<OrderEvent>,
    max_subscribers: usize,
}

impl OrderBroadcaster {
    pub fn new(max_subscribers: usize) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            max_subscribers,
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<OrderEvent>, AtCapacity> {
        if self.tx.receiver_count() >= self.max_subscribers {
            return Err(AtCapacity(self.max_subscribers));
        }
        Ok(self.tx.subscribe())
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns how many subscribers received it; zero when nobody is
    /// listening, which is not an error.
    pub fn publish(&self, event: OrderEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Current number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

//! API module
//!
//! HTTP API endpoints, shared state and middleware.

pub mod middleware;
pub mod routes;
pub mod upload;

pub use routes::create_router;

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::aggregate::OrderStore;
use crate::broadcast::OrderBroadcaster;
use crate::config::Config;
use crate::hash_store::HashStore;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<RwLock<OrderStore>>,
    pub hashes: Arc<RwLock<HashStore>>,
    pub broadcaster: OrderBroadcaster,
    pub pool: PgPool,
}

impl AppState {
    /// Build the state from a loaded configuration, database pool and
    /// hash store. The aggregate store and broadcaster are created fresh;
    /// tests get isolation by building a new state per test.
    pub fn new(config: Arc<Config>, pool: PgPool, hash_store: HashStore) -> Self {
        let broadcaster = OrderBroadcaster::new(config.max_stream_subscribers);
        let store = OrderStore::new(broadcaster.clone());

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            hashes: Arc::new(RwLock::new(hash_store)),
            broadcaster,
            pool,
        }
    }
}

//! legacyOrders - Legacy order file ingestion backend API
//!
//! Ingests fixed-width legacy order files, deduplicates them by content
//! hash, aggregates per-user orders in memory, and serves the aggregate
//! over REST plus a live order-update stream.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::header, http::Method, middleware, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod aggregate;
pub mod api;
pub mod broadcast;
mod config;
mod db;
pub mod domain;
mod error;
pub mod hash_store;
pub mod ingest;
pub mod persistence;
pub mod query;

pub use config::Config;
pub use error::{AppError, AppResult};

use api::AppState;
use hash_store::HashStore;

/// Initialize tracing/logging
fn init_tracing(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "legacy_orders=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    let api_router = api::create_router()
        .layer(middleware::from_fn(api::middleware::logging_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        // API routes
        .nest("/api", api_router)
        .layer(DefaultBodyLimit::max(state.config.file_size_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting legacyOrders server");
    tracing::info!("Connecting to database...");

    // Create database pool and ensure the document table exists
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    db::verify_connection(&pool).await?;
    db::ensure_schema(&pool).await?;

    tracing::info!("Database connected successfully");

    // Load the persisted hash sets. Missing files start empty; anything
    // else degraded means duplicates could slip through, so refuse to
    // start.
    let (hash_store, status) = HashStore::load(
        config.file_hashes_path.clone(),
        config.line_hashes_path.clone(),
    )
    .await;
    if status.is_degraded() {
        tracing::error!(?status, "hash store failed to load");
        return Err(anyhow::anyhow!("hash store failed to load"));
    }
    tracing::info!(
        file_hashes = hash_store.file_count(),
        line_hashes = hash_store.line_count(),
        "Hash store loaded"
    );

    let state = AppState::new(Arc::new(config), pool.clone(), hash_store);

    tracing::info!("Listening on http://{}", addr);

    // Build router and start server
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

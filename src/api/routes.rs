//! API Routes
//!
//! HTTP endpoint definitions.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Multipart, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use crate::domain::{OrderEvent, User};
use crate::error::AppError;
use crate::ingest::IngestPipeline;
use crate::persistence::UserOrderRepository;
use crate::query::{filter_users, OrderFilter};

use super::{upload, AppState};

// =========================================================================
// Request types
// =========================================================================

/// Query parameters of GET /memory/orders.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl OrdersQuery {
    /// Convert the raw query into typed filter criteria.
    ///
    /// Empty values count as absent; non-empty values that fail to parse
    /// are an invalid request.
    pub fn into_filter(self) -> Result<OrderFilter, AppError> {
        Ok(OrderFilter {
            user_id: parse_id(self.user_id, "userId")?,
            order_id: parse_id(self.order_id, "orderId")?,
            start_date: parse_date(self.start_date, "startDate")?,
            end_date: parse_date(self.end_date, "endDate")?,
        })
    }
}

/// Query parameters of GET /database/orders.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseOrdersQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

fn parse_id(raw: Option<String>, name: &str) -> Result<Option<i64>, AppError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidRequest(format!("Invalid {}: {:?}", name, value))),
    }
}

fn parse_date(raw: Option<String>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::InvalidRequest(format!("Invalid {}: {:?}", name, value))),
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(process_upload))
        .route("/memory/orders", get(get_orders))
        .route("/database/orders", get(get_database_orders))
        .route("/stream-orders", get(stream_orders))
}

// =========================================================================
// POST /upload
// =========================================================================

/// Stage the uploaded files, run them through the dedup/aggregation
/// pipeline and return one user entry per processed line.
///
/// After a successful batch that produced users: the batch hashes are
/// merged into the persistent store (duplicate-check toggle), and the
/// aggregates are saved to the document table (save-data toggle). An
/// insert failure fails this request only.
async fn process_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<User>>, AppError> {
    let staged = upload::store_uploads(multipart, &state.config).await?;
    if staged.is_empty() {
        return Err(AppError::NoFilesUploaded);
    }

    let pipeline = IngestPipeline::new(
        state.store.clone(),
        state.hashes.clone(),
        state.config.delete_files,
    );
    let batch = pipeline.ingest(&staged).await;

    if state.config.duplicity_check && !batch.users.is_empty() {
        let mut hashes = state.hashes.write().await;
        hashes
            .add_all(&batch.new_file_hashes, &batch.new_line_hashes)
            .await;
    }

    if state.config.save_data && !batch.users.is_empty() {
        let repository = UserOrderRepository::new(state.pool.clone());
        repository.insert_many(&batch.users).await?;
    }

    Ok(Json(batch.users))
}

// =========================================================================
// GET /memory/orders
// =========================================================================

/// Filter the in-memory aggregate.
async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    tracing::debug!(?query, "memory orders query");
    let filter = query.into_filter()?;

    let store = state.store.read().await;
    let users = filter_users(&store, &filter);

    if users.is_empty() {
        tracing::debug!("no orders matched the supplied filters");
    }

    Ok(Json(users))
}

// =========================================================================
// GET /database/orders
// =========================================================================

/// Query persisted aggregates. At least one filter is required; an empty
/// result is a 404.
async fn get_database_orders(
    State(state): State<AppState>,
    Query(query): Query<DatabaseOrdersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let user_id = parse_id(query.user_id, "userId")?;
    let order_id = parse_id(query.order_id, "orderId")?;

    if user_id.is_none() && order_id.is_none() {
        return Err(AppError::MissingFilter);
    }

    let repository = UserOrderRepository::new(state.pool.clone());
    let users = repository.find(user_id, order_id).await?;

    if users.is_empty() {
        return Err(AppError::NoOrdersFound);
    }

    Ok(Json(users))
}

// =========================================================================
// GET /stream-orders
// =========================================================================

/// Stream order updates to the client as Server-Sent Events.
///
/// Each event's data is the updated order, full product list included.
/// A keep-alive comment goes out every 20 seconds independently of the
/// event flow. Closing the connection drops the receiver, which
/// unsubscribes it.
async fn stream_orders(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.broadcaster.subscribe()?;
    tracing::info!(
        subscribers = state.broadcaster.subscriber_count(),
        "stream client connected"
    );

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(OrderEvent::OrderUpdated { order, .. }) => {
                Event::default().json_data(&order).ok().map(Ok)
            }
            Err(e) => {
                // Lagged subscriber: events were dropped, keep streaming.
                tracing::warn!(error = ?e, "stream subscriber lagged");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    ))
}

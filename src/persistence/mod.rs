//! Processed order persistence
//!
//! Saves finalized user aggregates to the `user_orders` document table
//! and queries them back by user/order id. Each row stores the full
//! aggregate as JSONB alongside indexed identity columns.

use sqlx::PgPool;

use crate::domain::User;

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Repository for finalized user aggregates.
#[derive(Debug, Clone)]
pub struct UserOrderRepository {
    pool: PgPool,
}

impl UserOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert every aggregate of a batch in one transaction.
    ///
    /// Returns the number of rows written. Failure rejects the whole
    /// batch; the caller surfaces it to the request, not the process.
    pub async fn insert_many(&self, users: &[User]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for user in users {
            let payload = serde_json::to_value(user)?;
            sqlx::query(
                r#"
                INSERT INTO user_orders (user_id, user_name, payload)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user.user_id)
            .bind(&user.user_name)
            .bind(&payload)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;

        tracing::info!(rows = inserted, "processed aggregates saved");
        Ok(inserted)
    }

    /// Query persisted aggregates by user id and/or order id.
    pub async fn find(
        &self,
        user_id: Option<i64>,
        order_id: Option<i64>,
    ) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            r#"
            SELECT payload
            FROM user_orders
            WHERE ($1::bigint IS NULL OR user_id = $1)
              AND (
                  $2::bigint IS NULL
                  OR payload -> 'orders' @> jsonb_build_array(jsonb_build_object('orderId', $2))
              )
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(payload,)| serde_json::from_value(payload).map_err(RepositoryError::from))
            .collect()
    }
}

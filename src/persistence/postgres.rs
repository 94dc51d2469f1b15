//! PostgreSQL implementation of the persistence ports.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{NewLogRecord, StoreStockTotal};
use super::{EventLog, StockCatalog};
use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// PostgreSQL-backed persistence using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects a pool using the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] when the database is
    /// unreachable within the configured timeout.
    pub async fn connect(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Runs the embedded migrations for the tables this crate owns.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] when a migration fails.
    pub async fn migrate(&self) -> Result<(), PipelineError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PipelineError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl EventLog for PostgresStore {
    async fn insert_event(&self, record: NewLogRecord) -> Result<i64, PipelineError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO stock_events_log \
             (topic, event_type, store_id, stock_id, admin_email, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&record.topic)
        .bind(&record.event_type)
        .bind(record.store_id)
        .bind(record.stock_id)
        .bind(&record.admin_email)
        .bind(&record.payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl StockCatalog for PostgresStore {
    async fn stock_totals_by_store(&self) -> Result<Vec<StoreStockTotal>, PipelineError> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT store_id, COALESCE(SUM(quantity), 0)::BIGINT \
             FROM stocks GROUP BY store_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(store_id, total_quantity)| StoreStockTotal {
                store_id,
                total_quantity,
            })
            .collect())
    }

    async fn store_names(&self) -> Result<HashMap<i64, String>, PipelineError> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM stores")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }
}

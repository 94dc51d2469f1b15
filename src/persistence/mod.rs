//! Persistence layer: PostgreSQL event audit log and catalog queries.
//!
//! Two ports: [`EventLog`] appends one audit row per consumed event, and
//! [`StockCatalog`] answers the point-in-time queries the gauge refresh
//! job needs. [`postgres::PostgresStore`] implements both over a shared
//! `sqlx::PgPool`.

pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod testing;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::PipelineError;
use models::{NewLogRecord, StoreStockTotal};

pub use postgres::PostgresStore;

/// Append-only audit log of consumed events.
#[async_trait]
pub trait EventLog: Send + Sync + fmt::Debug {
    /// Appends one row and returns its id.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] on database failure. The
    /// dispatcher treats this as non-fatal: the message's audit trail is
    /// simply missing.
    async fn insert_event(&self, record: NewLogRecord) -> Result<i64, PipelineError>;
}

/// Read-only catalog queries against the system of record.
#[async_trait]
pub trait StockCatalog: Send + Sync + fmt::Debug {
    /// Total stock quantity grouped by store.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] on database failure.
    async fn stock_totals_by_store(&self) -> Result<Vec<StoreStockTotal>, PipelineError>;

    /// Store display names keyed by store id.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] on database failure.
    async fn store_names(&self) -> Result<HashMap<i64, String>, PipelineError>;
}

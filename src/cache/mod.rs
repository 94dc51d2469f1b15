//! Key-value store port: durable counter checkpoints and bounded
//! recent-activity lists.
//!
//! Two implementations exist: [`RedisKvStore`] over a bb8 connection pool
//! for production, and [`InMemoryKvStore`] for tests and local runs
//! without a Redis backend. Both uphold the bounded-list invariant: the
//! activity list never exceeds [`RECENT_ACTIVITY_LIMIT`] entries after a
//! completed push.

pub mod memory;
pub mod redis_store;

use std::fmt;

use async_trait::async_trait;

use crate::error::PipelineError;

pub use memory::InMemoryKvStore;
pub use redis_store::RedisKvStore;

/// Maximum entries retained in a per-store recent-activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 100;

/// Builds the recent-activity list key for a store.
#[must_use]
pub fn activity_key(store_id: i64) -> String {
    format!("activity:{store_id}")
}

/// Port for the key-value store backing checkpoints and activity lists.
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Reads a counter checkpoint, if present.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable
    /// or the stored value is not numeric.
    async fn get_counter(&self, key: &str) -> Result<Option<f64>, PipelineError>;

    /// Writes a counter checkpoint (last-write-wins).
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable.
    async fn set_counter(&self, key: &str, value: f64) -> Result<(), PipelineError>;

    /// Lists keys matching a `prefix:*` pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, PipelineError>;

    /// Pushes a JSON entry to the head of a bounded list and trims the
    /// list to [`RECENT_ACTIVITY_LIMIT`] in the same logical operation.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable.
    async fn push_activity(&self, key: &str, entry: &str) -> Result<(), PipelineError>;

    /// Reads up to `limit` entries from the head of a bounded list,
    /// most recent first.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable.
    async fn recent_activity(&self, key: &str, limit: usize)
    -> Result<Vec<String>, PipelineError>;
}

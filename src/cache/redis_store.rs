//! Redis implementation of the key-value store port.
//!
//! Uses `bb8-redis` for connection pooling. The push-and-trim pair runs
//! inside an atomic pipeline (MULTI/EXEC) so a crash between the two
//! commands can never leave the list unbounded.

use std::fmt;

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{RedisConnectionManager, redis};

use super::{KeyValueStore, RECENT_ACTIVITY_LIMIT};
use crate::error::PipelineError;

/// Key-value store backed by a pooled Redis connection.
pub struct RedisKvStore {
    pool: Pool<RedisConnectionManager>,
}

impl fmt::Debug for RedisKvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisKvStore").finish_non_exhaustive()
    }
}

impl RedisKvStore {
    /// Connects a pool to the given Redis URL.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the URL is invalid or the
    /// pool cannot be built.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, PipelineError> {
        let manager =
            RedisConnectionManager::new(url).map_err(|e| PipelineError::Cache(e.to_string()))?;
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .await
            .map_err(|e| PipelineError::Cache(e.to_string()))?;
        Ok(Self { pool })
    }
}

fn cache_err(err: impl fmt::Display) -> PipelineError {
    PipelineError::Cache(err.to_string())
}

#[async_trait]
impl KeyValueStore for RedisKvStore {
    async fn get_counter(&self, key: &str) -> Result<Option<f64>, PipelineError> {
        let mut pooled = self.pool.get().await.map_err(cache_err)?;
        let conn = &mut *pooled;
        let value: Option<f64> = conn.get(key).await.map_err(cache_err)?;
        Ok(value)
    }

    async fn set_counter(&self, key: &str, value: f64) -> Result<(), PipelineError> {
        let mut pooled = self.pool.get().await.map_err(cache_err)?;
        let conn = &mut *pooled;
        let _: () = conn.set(key, value).await.map_err(cache_err)?;
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, PipelineError> {
        let mut pooled = self.pool.get().await.map_err(cache_err)?;
        let conn = &mut *pooled;

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(conn)
                .await
                .map_err(cache_err)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }

    async fn push_activity(&self, key: &str, entry: &str) -> Result<(), PipelineError> {
        let mut pooled = self.pool.get().await.map_err(cache_err)?;
        let conn = &mut *pooled;

        // LPUSH + LTRIM must land together; the trim keeps indexes
        // 0..=limit-1, i.e. the most recent entries.
        let end = isize::try_from(RECENT_ACTIVITY_LIMIT).unwrap_or(isize::MAX) - 1;
        let _: () = redis::pipe()
            .atomic()
            .lpush(key, entry)
            .ignore()
            .ltrim(key, 0, end)
            .ignore()
            .query_async(conn)
            .await
            .map_err(cache_err)?;
        Ok(())
    }

    async fn recent_activity(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<String>, PipelineError> {
        let mut pooled = self.pool.get().await.map_err(cache_err)?;
        let conn = &mut *pooled;
        let end = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
        let entries: Vec<String> = conn.lrange(key, 0, end).await.map_err(cache_err)?;
        Ok(entries)
    }
}

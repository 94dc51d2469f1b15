//! In-memory implementation of the key-value store port.
//!
//! Mirrors the Redis semantics the pipeline relies on — numeric
//! checkpoints, trailing-star key scans, and push-then-truncate bounded
//! lists — without a network dependency. Used by the test suite and for
//! local runs without Redis.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{KeyValueStore, RECENT_ACTIVITY_LIMIT};
use crate::error::PipelineError;

#[derive(Debug, Default)]
struct Inner {
    counters: HashMap<String, f64>,
    lists: HashMap<String, VecDeque<String>>,
}

/// Key-value store held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    inner: Mutex<Inner>,
}

impl InMemoryKvStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, PipelineError> {
        self.inner
            .lock()
            .map_err(|_| PipelineError::Cache("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get_counter(&self, key: &str) -> Result<Option<f64>, PipelineError> {
        Ok(self.lock()?.counters.get(key).copied())
    }

    async fn set_counter(&self, key: &str, value: f64) -> Result<(), PipelineError> {
        self.lock()?.counters.insert(key.to_string(), value);
        Ok(())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, PipelineError> {
        // Only the `prefix:*` shape the pipeline uses is supported.
        let inner = self.lock()?;
        let keys = match pattern.strip_suffix('*') {
            Some(prefix) => inner
                .counters
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect(),
            None => inner
                .counters
                .keys()
                .filter(|k| k.as_str() == pattern)
                .cloned()
                .collect(),
        };
        Ok(keys)
    }

    async fn push_activity(&self, key: &str, entry: &str) -> Result<(), PipelineError> {
        let mut inner = self.lock()?;
        let list = inner.lists.entry(key.to_string()).or_default();
        list.push_front(entry.to_string());
        list.truncate(RECENT_ACTIVITY_LIMIT);
        Ok(())
    }

    async fn recent_activity(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<String>, PipelineError> {
        let inner = self.lock()?;
        Ok(inner
            .lists
            .get(key)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

//! In-memory persistence doubles for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{LogRecord, NewLogRecord, StoreStockTotal};
use super::{EventLog, StockCatalog};
use crate::error::PipelineError;

/// [`EventLog`] double that appends to an in-memory vector.
///
/// Can be switched into a failing mode to exercise the dispatcher's
/// write-error recovery.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    records: Mutex<Vec<LogRecord>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every appended record.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Makes subsequent inserts fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn insert_event(&self, record: NewLogRecord) -> Result<i64, PipelineError> {
        if self.fail_writes.lock().map(|f| *f).unwrap_or(false) {
            return Err(PipelineError::Persistence("simulated failure".to_string()));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|_| PipelineError::Persistence("log lock poisoned".to_string()))?;
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX) + 1;
        records.push(LogRecord {
            id,
            topic: record.topic,
            event_type: record.event_type,
            store_id: record.store_id,
            stock_id: record.stock_id,
            admin_email: record.admin_email,
            payload: record.payload,
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

/// [`StockCatalog`] double serving fixed rows.
#[derive(Debug, Default)]
pub struct FixedCatalog {
    totals: Mutex<Vec<StoreStockTotal>>,
    names: Mutex<HashMap<i64, String>>,
}

impl FixedCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the served stock totals.
    pub fn set_totals(&self, totals: Vec<StoreStockTotal>) {
        if let Ok(mut t) = self.totals.lock() {
            *t = totals;
        }
    }

    /// Replaces the served store names.
    pub fn set_names(&self, names: HashMap<i64, String>) {
        if let Ok(mut n) = self.names.lock() {
            *n = names;
        }
    }
}

#[async_trait]
impl StockCatalog for FixedCatalog {
    async fn stock_totals_by_store(&self) -> Result<Vec<StoreStockTotal>, PipelineError> {
        Ok(self.totals.lock().map(|t| t.clone()).unwrap_or_default())
    }

    async fn store_names(&self) -> Result<HashMap<i64, String>, PipelineError> {
        Ok(self.names.lock().map(|n| n.clone()).unwrap_or_default())
    }
}

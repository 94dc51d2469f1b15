//! Database models for the event audit log and catalog queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A new audit row, ready to insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLogRecord {
    /// Topic the event arrived on.
    pub topic: String,
    /// Wire discriminator as received (may be unrecognized).
    pub event_type: String,
    /// Store identifier, when derivable from the payload.
    pub store_id: Option<i64>,
    /// Stock identifier, when the payload carried one.
    pub stock_id: Option<i64>,
    /// Acting admin, when the payload carried one.
    pub admin_email: Option<String>,
    /// Full event payload as received.
    pub payload: serde_json::Value,
}

/// A stored audit row from the `stock_events_log` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Topic the event arrived on.
    pub topic: String,
    /// Wire discriminator as received.
    pub event_type: String,
    /// Store identifier, when derivable.
    pub store_id: Option<i64>,
    /// Stock identifier, when present.
    pub stock_id: Option<i64>,
    /// Acting admin, when present.
    pub admin_email: Option<String>,
    /// JSONB payload with the full event.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Total stock quantity for one store, from the system of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStockTotal {
    /// Store identifier.
    pub store_id: i64,
    /// Sum of quantities over the store's stock rows.
    pub total_quantity: i64,
}

//! # stockpulse
//!
//! Event-driven stock and metrics pipeline for a multi-tenant retail
//! platform. Consumes inventory events from broker topics, keeps an
//! append-only audit log and a bounded per-store recent-activity cache,
//! and restores cumulative counters from durable checkpoints after a
//! restart so externally-scraped metrics survive redeploys.
//!
//! ## Architecture
//!
//! ```text
//! Producers (mutation handlers, rebalancer)
//!     │  publish
//!     ▼
//! ChannelBroker (broker/)            topics: stock-events,
//!     │  single consumer group               stock-alerts, store-events
//!     ▼
//! EventDispatcher (pipeline/)
//!     ├── per-topic handlers (trace logging)
//!     ├── EventLog       → PostgreSQL audit rows (persistence/)
//!     └── KeyValueStore  → bounded activity lists (cache/)
//!
//! MetricsRegistry (metrics/)
//!     ├── CounterRestorer   ← durable checkpoints, once per key
//!     ├── CounterFlushJob   → durable checkpoints, periodic
//!     ├── GaugeRefreshJob   ← StockCatalog, full replace per tick
//!     └── /metrics exposition (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod broker;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod pipeline;

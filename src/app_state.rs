//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::broker::ChannelBroker;
use crate::cache::KeyValueStore;
use crate::metrics::PrometheusMetrics;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Metrics registry backing the `/metrics` exposition.
    pub metrics: Arc<PrometheusMetrics>,
    /// Key-value store for recent-activity reads.
    pub kv: Arc<dyn KeyValueStore>,
    /// Broker for the event ingest bridge.
    pub broker: Arc<ChannelBroker>,
}

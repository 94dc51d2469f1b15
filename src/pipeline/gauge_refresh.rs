//! Gauge refresh: periodic recompute of point-in-time gauges.
//!
//! The event stream keeps counters current, but gauges drift (missed
//! events, manual database edits). Each tick replaces the whole gauge
//! family from the system of record: `reset_all`, then one `set` per
//! store. A store with no stock rows receives no `set` after the reset,
//! so it drops out of the exposition instead of going stale.

use std::sync::Arc;
use std::time::Duration;

use crate::error::PipelineError;
use crate::metrics::{MetricsRegistry, names};
use crate::persistence::StockCatalog;

/// Periodic full-replace recompute of `store_stock_quantity`.
#[derive(Debug)]
pub struct GaugeRefreshJob {
    catalog: Arc<dyn StockCatalog>,
    metrics: Arc<dyn MetricsRegistry>,
    interval: Duration,
}

impl GaugeRefreshJob {
    /// Creates a job that refreshes every `interval`.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn StockCatalog>,
        metrics: Arc<dyn MetricsRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            catalog,
            metrics,
            interval,
        }
    }

    /// Runs the refresh loop forever. Tick failures are logged and the
    /// next tick proceeds.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.refresh().await {
                tracing::warn!(error = %err, "gauge refresh tick failed");
            }
        }
    }

    /// Performs one full-replace refresh.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Persistence`] when a catalog query
    /// fails; the gauge is left untouched in that case (both queries run
    /// before the reset).
    pub async fn refresh(&self) -> Result<(), PipelineError> {
        let totals = self.catalog.stock_totals_by_store().await?;
        let store_names = self.catalog.store_names().await?;

        self.metrics.reset_all(names::STORE_STOCK_QUANTITY);
        for total in &totals {
            let store_id = total.store_id.to_string();
            let store_name = store_names
                .get(&total.store_id)
                .cloned()
                .unwrap_or_else(|| store_id.clone());
            #[allow(clippy::cast_precision_loss)]
            let quantity = total.total_quantity as f64;
            self.metrics.set(
                names::STORE_STOCK_QUANTITY,
                &[("store_id", &store_id), ("store_name", &store_name)],
                quantity,
            );
        }
        tracing::debug!(stores = totals.len(), "store stock gauges refreshed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::metrics::PrometheusMetrics;
    use crate::metrics::testing::{RecordingRegistry, RegistryOp};
    use crate::persistence::models::StoreStockTotal;
    use crate::persistence::testing::FixedCatalog;
    use std::collections::HashMap;

    fn make_job(
        catalog: Arc<FixedCatalog>,
        metrics: Arc<dyn MetricsRegistry>,
    ) -> GaugeRefreshJob {
        GaugeRefreshJob::new(
            catalog as Arc<dyn StockCatalog>,
            metrics,
            Duration::from_secs(60),
        )
    }

    /// `reset_all` runs before any `set` within a tick.
    #[tokio::test]
    async fn reset_precedes_every_set() {
        let catalog = Arc::new(FixedCatalog::new());
        catalog.set_totals(vec![
            StoreStockTotal {
                store_id: 5,
                total_quantity: 12,
            },
            StoreStockTotal {
                store_id: 6,
                total_quantity: 3,
            },
        ]);
        catalog.set_names(HashMap::from([(5, "Corner Shop".to_string())]));
        let recorder = Arc::new(RecordingRegistry::new());
        let job = make_job(catalog, Arc::clone(&recorder) as Arc<dyn MetricsRegistry>);

        let Ok(()) = job.refresh().await else {
            panic!("refresh should succeed");
        };

        let ops = recorder.ops();
        let reset_at = ops
            .iter()
            .position(|op| matches!(op, RegistryOp::ResetAll { name } if name == names::STORE_STOCK_QUANTITY));
        let first_set = ops
            .iter()
            .position(|op| matches!(op, RegistryOp::Set { .. }));
        assert!(reset_at.is_some());
        assert!(first_set.is_some());
        assert!(reset_at < first_set);
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, RegistryOp::Set { .. }))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn store_dropping_to_zero_rows_vanishes_after_tick() {
        let catalog = Arc::new(FixedCatalog::new());
        catalog.set_totals(vec![StoreStockTotal {
            store_id: 5,
            total_quantity: 12,
        }]);
        catalog.set_names(HashMap::from([(5, "Corner Shop".to_string())]));
        let Ok(metrics) = PrometheusMetrics::new() else {
            panic!("registry construction should succeed");
        };
        let metrics = Arc::new(metrics);
        let job = make_job(
            Arc::clone(&catalog),
            Arc::clone(&metrics) as Arc<dyn MetricsRegistry>,
        );

        let Ok(()) = job.refresh().await else {
            panic!("refresh should succeed");
        };
        let labels = [("store_id", "5"), ("store_name", "Corner Shop")];
        assert_eq!(
            metrics.gauge_value(names::STORE_STOCK_QUANTITY, &labels),
            Some(12.0)
        );

        // The store's stock rows disappear; the next tick must not carry
        // the stale value forward.
        catalog.set_totals(Vec::new());
        let Ok(()) = job.refresh().await else {
            panic!("refresh should succeed");
        };
        assert_eq!(
            metrics.gauge_value(names::STORE_STOCK_QUANTITY, &labels),
            Some(0.0)
        );
    }

    #[tokio::test]
    async fn missing_store_name_falls_back_to_id() {
        let catalog = Arc::new(FixedCatalog::new());
        catalog.set_totals(vec![StoreStockTotal {
            store_id: 7,
            total_quantity: 4,
        }]);
        let recorder = Arc::new(RecordingRegistry::new());
        let job = make_job(catalog, Arc::clone(&recorder) as Arc<dyn MetricsRegistry>);

        let Ok(()) = job.refresh().await else {
            panic!("refresh should succeed");
        };

        let ops = recorder.ops();
        assert!(ops.iter().any(|op| matches!(
            op,
            RegistryOp::Set { labels, .. }
                if labels.contains(&("store_name".to_string(), "7".to_string()))
        )));
    }
}

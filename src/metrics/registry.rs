//! The metrics registry port and its Prometheus-backed implementation.
//!
//! [`MetricsRegistry`] is the seam every component increments through;
//! [`PrometheusMetrics`] registers the families from
//! [`crate::metrics::names`] once at construction and maps label pairs to
//! the `prometheus` crate's vectors. Label mismatches are logged and
//! dropped — metric recording never fails a caller.

use std::collections::HashMap;
use std::fmt;

use prometheus::{Counter, CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::PipelineError;
use crate::metrics::names::{COUNTER_FAMILIES, GAUGE_FAMILIES};

/// A point-in-time reading of one counter accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSample {
    /// Metric family name.
    pub name: String,
    /// Label pairs in exposition order.
    pub labels: Vec<(String, String)>,
    /// Cumulative value.
    pub value: f64,
}

/// Process-wide registry of named, labeled counters and gauges.
///
/// Implementations must be safe to call concurrently from multiple tasks.
/// Counters are monotone per label combination; gauges are
/// last-write-wins. All methods are infallible from the caller's point of
/// view: an unknown family or a mismatched label set is logged and
/// dropped.
pub trait MetricsRegistry: Send + Sync + fmt::Debug {
    /// Adds `delta` to the counter accumulator for the given label
    /// combination, creating it at zero first if absent.
    fn increment(&self, name: &str, labels: &[(&str, &str)], delta: f64);

    /// Sets a gauge to `value` for the given label combination.
    fn set(&self, name: &str, labels: &[(&str, &str)], value: f64);

    /// Clears every label combination of a gauge family, ahead of a full
    /// recompute sweep.
    fn reset_all(&self, name: &str);

    /// Snapshots the current value of every counter accumulator.
    fn counter_samples(&self) -> Vec<CounterSample>;
}

/// [`MetricsRegistry`] backed by the `prometheus` crate.
///
/// Every family is registered at construction; the inner
/// [`prometheus::Registry`] feeds the `/metrics` text exposition.
pub struct PrometheusMetrics {
    registry: Registry,
    counters: HashMap<&'static str, (CounterVec, &'static [&'static str])>,
    globals: HashMap<&'static str, Counter>,
    gauges: HashMap<&'static str, (GaugeVec, &'static [&'static str])>,
}

impl fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("counters", &self.counters.len())
            .field("globals", &self.globals.len())
            .field("gauges", &self.gauges.len())
            .finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Creates a registry with every known family pre-registered.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Metrics`] if a family cannot be
    /// registered (e.g. a duplicate name).
    pub fn new() -> Result<Self, PipelineError> {
        let registry = Registry::new();
        let mut counters = HashMap::new();
        let mut globals = HashMap::new();
        let mut gauges = HashMap::new();

        for family in COUNTER_FAMILIES {
            if family.labels.is_empty() {
                let counter = Counter::new(family.name, family.help)?;
                registry.register(Box::new(counter.clone()))?;
                globals.insert(family.name, counter);
            } else {
                let vec = CounterVec::new(Opts::new(family.name, family.help), family.labels)?;
                registry.register(Box::new(vec.clone()))?;
                counters.insert(family.name, (vec, family.labels));
            }
        }

        for family in GAUGE_FAMILIES {
            let vec = GaugeVec::new(Opts::new(family.name, family.help), family.labels)?;
            registry.register(Box::new(vec.clone()))?;
            gauges.insert(family.name, (vec, family.labels));
        }

        Ok(Self {
            registry,
            counters,
            globals,
            gauges,
        })
    }

    /// Renders the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Metrics`] if encoding fails.
    pub fn encode_text(&self) -> Result<String, PipelineError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| PipelineError::Metrics(e.to_string()))
    }

    /// Reads the current value of a counter accumulator, creating it at
    /// zero if absent. Returns `None` for unknown families or label sets
    /// that do not match the family's keys.
    #[must_use]
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        if labels.is_empty() {
            if let Some(counter) = self.globals.get(name) {
                return Some(counter.get());
            }
        }
        let (vec, keys) = self.counters.get(name)?;
        let values = ordered_values(keys, labels)?;
        vec.get_metric_with_label_values(&values)
            .ok()
            .map(|c| c.get())
    }

    /// Reads the current value of a gauge, creating it at zero if absent.
    #[must_use]
    pub fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let (vec, keys) = self.gauges.get(name)?;
        let values = ordered_values(keys, labels)?;
        vec.get_metric_with_label_values(&values)
            .ok()
            .map(|g| g.get())
    }
}

impl MetricsRegistry for PrometheusMetrics {
    fn increment(&self, name: &str, labels: &[(&str, &str)], delta: f64) {
        if delta < 0.0 {
            tracing::warn!(metric = name, delta, "negative counter delta dropped");
            return;
        }
        if labels.is_empty() {
            if let Some(counter) = self.globals.get(name) {
                counter.inc_by(delta);
                return;
            }
        }
        let Some((vec, keys)) = self.counters.get(name) else {
            tracing::warn!(metric = name, "increment on unknown counter family");
            return;
        };
        let Some(values) = ordered_values(keys, labels) else {
            tracing::warn!(metric = name, ?labels, "label set does not match counter family");
            return;
        };
        vec.with_label_values(&values).inc_by(delta);
    }

    fn set(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let Some((vec, keys)) = self.gauges.get(name) else {
            tracing::warn!(metric = name, "set on unknown gauge family");
            return;
        };
        let Some(values) = ordered_values(keys, labels) else {
            tracing::warn!(metric = name, ?labels, "label set does not match gauge family");
            return;
        };
        vec.with_label_values(&values).set(value);
    }

    fn reset_all(&self, name: &str) {
        let Some((vec, _)) = self.gauges.get(name) else {
            tracing::warn!(metric = name, "reset_all on unknown gauge family");
            return;
        };
        vec.reset();
    }

    fn counter_samples(&self) -> Vec<CounterSample> {
        let mut samples = Vec::new();
        for family in self.registry.gather() {
            let name = family.name();
            if !self.counters.contains_key(name) && !self.globals.contains_key(name) {
                continue;
            }
            for metric in &family.metric {
                let labels = metric
                    .label
                    .iter()
                    .map(|l| (l.name().to_string(), l.value().to_string()))
                    .collect();
                samples.push(CounterSample {
                    name: name.to_string(),
                    labels,
                    value: metric.counter.value(),
                });
            }
        }
        samples
    }
}

/// Orders supplied label pairs by the family's registered keys.
///
/// Returns `None` when the supplied set is not exactly the family's key
/// set (missing or surplus labels).
fn ordered_values<'a>(keys: &[&str], labels: &[(&'a str, &'a str)]) -> Option<Vec<&'a str>> {
    if labels.len() != keys.len() {
        return None;
    }
    keys.iter()
        .map(|key| {
            labels
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| *v)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::metrics::names;

    fn make_registry() -> PrometheusMetrics {
        let Ok(metrics) = PrometheusMetrics::new() else {
            panic!("registry construction should succeed");
        };
        metrics
    }

    #[test]
    fn increment_creates_accumulator_at_zero() {
        let metrics = make_registry();
        let labels = [("admin_email", "a@x.com"), ("store_id", "5")];
        metrics.increment(names::STOCKS_ADDED_TOTAL, &labels, 1.0);
        metrics.increment(names::STOCKS_ADDED_TOTAL, &labels, 2.0);
        assert_eq!(
            metrics.counter_value(names::STOCKS_ADDED_TOTAL, &labels),
            Some(3.0)
        );
    }

    #[test]
    fn label_combinations_are_independent_accumulators() {
        let metrics = make_registry();
        metrics.increment(
            names::STOCKS_ADDED_TOTAL,
            &[("admin_email", "a@x.com"), ("store_id", "5")],
            1.0,
        );
        metrics.increment(
            names::STOCKS_ADDED_TOTAL,
            &[("admin_email", "a@x.com"), ("store_id", "6")],
            4.0,
        );
        assert_eq!(
            metrics.counter_value(
                names::STOCKS_ADDED_TOTAL,
                &[("admin_email", "a@x.com"), ("store_id", "5")]
            ),
            Some(1.0)
        );
        assert_eq!(
            metrics.counter_value(
                names::STOCKS_ADDED_TOTAL,
                &[("admin_email", "a@x.com"), ("store_id", "6")]
            ),
            Some(4.0)
        );
    }

    #[test]
    fn label_order_does_not_matter() {
        let metrics = make_registry();
        metrics.increment(
            names::STOCKS_ADDED_TOTAL,
            &[("store_id", "5"), ("admin_email", "a@x.com")],
            2.0,
        );
        assert_eq!(
            metrics.counter_value(
                names::STOCKS_ADDED_TOTAL,
                &[("admin_email", "a@x.com"), ("store_id", "5")]
            ),
            Some(2.0)
        );
    }

    #[test]
    fn mismatched_labels_are_dropped() {
        let metrics = make_registry();
        metrics.increment(
            names::STOCKS_ADDED_TOTAL,
            &[("admin_email", "a@x.com")],
            1.0,
        );
        // Nothing was recorded for any combination of the family.
        assert!(
            metrics
                .counter_samples()
                .iter()
                .all(|s| s.name != names::STOCKS_ADDED_TOTAL)
        );
    }

    #[test]
    fn global_counter_increments_without_labels() {
        let metrics = make_registry();
        metrics.increment(names::KAFKA_MESSAGES_PRODUCED_TOTAL, &[], 1.0);
        metrics.increment(names::KAFKA_MESSAGES_PRODUCED_TOTAL, &[], 1.0);
        assert_eq!(
            metrics.counter_value(names::KAFKA_MESSAGES_PRODUCED_TOTAL, &[]),
            Some(2.0)
        );
    }

    #[test]
    fn reset_all_clears_gauge_combinations() {
        let metrics = make_registry();
        let labels = [("store_id", "5"), ("store_name", "Corner Shop")];
        metrics.set(names::STORE_STOCK_QUANTITY, &labels, 12.0);
        assert_eq!(
            metrics.gauge_value(names::STORE_STOCK_QUANTITY, &labels),
            Some(12.0)
        );

        metrics.reset_all(names::STORE_STOCK_QUANTITY);
        // After the reset the combination reads as freshly created (zero).
        assert_eq!(
            metrics.gauge_value(names::STORE_STOCK_QUANTITY, &labels),
            Some(0.0)
        );
    }

    #[test]
    fn counter_samples_reflect_touched_combinations() {
        let metrics = make_registry();
        metrics.increment(
            names::STOCKS_ADDED_TOTAL,
            &[("admin_email", "a@x.com"), ("store_id", "5")],
            7.0,
        );
        metrics.increment(names::KAFKA_MESSAGES_PRODUCED_TOTAL, &[], 3.0);

        let samples = metrics.counter_samples();
        assert!(samples.iter().any(|s| {
            s.name == names::STOCKS_ADDED_TOTAL
                && s.value == 7.0
                && s.labels
                    .contains(&("admin_email".to_string(), "a@x.com".to_string()))
        }));
        assert!(
            samples
                .iter()
                .any(|s| s.name == names::KAFKA_MESSAGES_PRODUCED_TOTAL && s.value == 3.0)
        );
    }

    #[test]
    fn exposition_includes_family_names() {
        let metrics = make_registry();
        metrics.increment(names::REDIS_CACHE_HITS_TOTAL, &[], 1.0);
        let Ok(text) = metrics.encode_text() else {
            panic!("exposition should encode");
        };
        assert!(text.contains("redis_cache_hits_total"));
    }
}

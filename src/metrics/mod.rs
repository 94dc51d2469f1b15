//! Metrics layer: family definitions and the process-wide registry.
//!
//! The registry is an explicit injected service ([`MetricsRegistry`])
//! rather than a module-level singleton, so background jobs and tests can
//! substitute their own implementation. The production implementation
//! ([`PrometheusMetrics`]) backs the `/metrics` text exposition.

pub mod names;
pub mod registry;

#[cfg(test)]
pub mod testing;

pub use registry::{CounterSample, MetricsRegistry, PrometheusMetrics};

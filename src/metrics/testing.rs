//! Recording registry double for unit tests.

use std::sync::Mutex;

use super::registry::{CounterSample, MetricsRegistry};

/// One recorded registry call.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryOp {
    /// An `increment` call.
    Increment {
        /// Metric family name.
        name: String,
        /// Label pairs as supplied.
        labels: Vec<(String, String)>,
        /// Delta applied.
        delta: f64,
    },
    /// A `set` call.
    Set {
        /// Metric family name.
        name: String,
        /// Label pairs as supplied.
        labels: Vec<(String, String)>,
        /// Value written.
        value: f64,
    },
    /// A `reset_all` call.
    ResetAll {
        /// Metric family name.
        name: String,
    },
}

/// [`MetricsRegistry`] double that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    ops: Mutex<Vec<RegistryOp>>,
}

impl RecordingRegistry {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded call in invocation order.
    #[must_use]
    pub fn ops(&self) -> Vec<RegistryOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    fn record(&self, op: RegistryOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

impl MetricsRegistry for RecordingRegistry {
    fn increment(&self, name: &str, labels: &[(&str, &str)], delta: f64) {
        self.record(RegistryOp::Increment {
            name: name.to_string(),
            labels: owned(labels),
            delta,
        });
    }

    fn set(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        self.record(RegistryOp::Set {
            name: name.to_string(),
            labels: owned(labels),
            value,
        });
    }

    fn reset_all(&self, name: &str) {
        self.record(RegistryOp::ResetAll {
            name: name.to_string(),
        });
    }

    fn counter_samples(&self) -> Vec<CounterSample> {
        // One sample per (name, labels) accumulator, like the production
        // registry, not one per increment call.
        let mut samples: Vec<CounterSample> = Vec::new();
        for op in self.ops() {
            if let RegistryOp::Increment {
                name,
                labels,
                delta,
            } = op
            {
                match samples
                    .iter_mut()
                    .find(|s| s.name == name && s.labels == labels)
                {
                    Some(sample) => sample.value += delta,
                    None => samples.push(CounterSample {
                        name,
                        labels,
                        value: delta,
                    }),
                }
            }
        }
        samples
    }
}

fn owned(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn samples_accumulate_per_label_combination() {
        let recorder = RecordingRegistry::new();
        let labels = [("admin_email", "a@x.com"), ("store_id", "5")];
        recorder.increment("stocks_added_total", &labels, 1.0);
        recorder.increment("stocks_added_total", &labels, 2.0);
        recorder.increment(
            "stocks_added_total",
            &[("admin_email", "a@x.com"), ("store_id", "6")],
            4.0,
        );

        let samples = recorder.counter_samples();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().any(|s| {
            s.value == 3.0
                && s.labels
                    .contains(&("store_id".to_string(), "5".to_string()))
        }));
        assert!(samples.iter().any(|s| {
            s.value == 4.0
                && s.labels
                    .contains(&("store_id".to_string(), "6".to_string()))
        }));
    }
}

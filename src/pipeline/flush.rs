//! Counter flush: periodic checkpointing of cumulative counter values.
//!
//! Writes every counter accumulator's current total to the durable store
//! under its canonical key. The checkpoint is what restoration reads
//! after a restart; values recorded between the last flush and a crash
//! are lost, which is the design's accepted data-loss window.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::KeyValueStore;
use crate::domain::CounterKey;
use crate::error::PipelineError;
use crate::metrics::MetricsRegistry;

/// Periodic checkpoint of counter totals into the key-value store.
#[derive(Debug)]
pub struct CounterFlushJob {
    kv: Arc<dyn KeyValueStore>,
    metrics: Arc<dyn MetricsRegistry>,
    interval: Duration,
}

impl CounterFlushJob {
    /// Creates a job that flushes every `interval`.
    #[must_use]
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        metrics: Arc<dyn MetricsRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            kv,
            metrics,
            interval,
        }
    }

    /// Runs the flush loop forever. Tick failures are logged and the next
    /// tick proceeds.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.flush().await {
                Ok(written) => tracing::debug!(written, "counter checkpoints flushed"),
                Err(err) => tracing::warn!(error = %err, "counter flush tick failed"),
            }
        }
    }

    /// Writes one checkpoint per counter accumulator and returns how many
    /// were written.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store becomes
    /// unreachable; checkpoints already written in this tick stay
    /// written (last-write-wins makes partial flushes harmless).
    pub async fn flush(&self) -> Result<usize, PipelineError> {
        let samples = self.metrics.counter_samples();
        let mut written = 0;
        for sample in samples {
            let key = CounterKey {
                name: sample.name,
                labels: sample.labels.into_iter().collect::<BTreeMap<_, _>>(),
            }
            .encode();
            self.kv.set_counter(&key, sample.value).await?;
            written += 1;
        }
        Ok(written)
    }
}

//! Counter restoration: re-seeding in-memory counters after a restart.
//!
//! Counters live in process memory and would read zero to scrapers after
//! every redeploy. The restorer reads the durable checkpoints written by
//! the flush job and replays each into the registry exactly once per key.
//! The seen-key set is the correctness-critical guard: once a value has
//! been seeded, the accumulator cannot distinguish "seeded" from "freshly
//! incremented", so a second application would double-count.
//!
//! The seen set is not persisted across process restarts; a crash midway
//! through restoration can therefore double-seed after the next start.
//! That matches the observed behavior of the checkpoint design and is
//! accepted as part of its data-loss window.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::KeyValueStore;
use crate::config::PipelineConfig;
use crate::domain::CounterKey;
use crate::error::PipelineError;
use crate::metrics::{MetricsRegistry, names};

#[derive(Debug, Clone, Copy)]
enum Pass {
    Labeled,
    Global,
}

impl Pass {
    const fn name(self) -> &'static str {
        match self {
            Self::Labeled => "labeled",
            Self::Global => "global",
        }
    }
}

/// Startup routine that replays durable counter checkpoints into the
/// registry, at most once per key per process lifetime.
#[derive(Debug)]
pub struct CounterRestorer {
    kv: Arc<dyn KeyValueStore>,
    metrics: Arc<dyn MetricsRegistry>,
    seen: Mutex<HashSet<String>>,
    warmup: Duration,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CounterRestorer {
    /// Creates a restorer with timing taken from the configuration.
    #[must_use]
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        metrics: Arc<dyn MetricsRegistry>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            kv,
            metrics,
            seen: Mutex::new(HashSet::new()),
            warmup: Duration::from_secs(config.restore_warmup_secs),
            max_attempts: config.restore_max_attempts.max(1),
            retry_delay: Duration::from_secs(config.restore_retry_delay_secs),
        }
    }

    /// Runs the full restoration: warm-up delay, then the labeled sweep
    /// and the global sweep, each under its own bounded retry.
    ///
    /// Never fails the caller — exhausting retries degrades to starting
    /// with under-reported counters.
    pub async fn run(&self) {
        tokio::time::sleep(self.warmup).await;
        self.retry(Pass::Labeled).await;
        self.retry(Pass::Global).await;
    }

    async fn retry(&self, pass: Pass) {
        let pass_name = pass.name();
        for attempt in 1..=self.max_attempts {
            let result = match pass {
                Pass::Labeled => self.restore_labeled().await,
                Pass::Global => self.restore_globals().await,
            };
            match result {
                Ok(seeded) => {
                    tracing::info!(pass = pass_name, seeded, "counter restoration pass complete");
                    return;
                }
                Err(err) => {
                    tracing::warn!(
                        pass = pass_name,
                        attempt,
                        error = %err,
                        "counter restoration attempt failed"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        tracing::warn!(
            pass = pass_name,
            "counter restoration abandoned; metrics start under-reported"
        );
    }

    /// Sweeps every labeled counter family's `name:*` checkpoint keys.
    ///
    /// A key seeds the registry only when every label the family
    /// registers is present in the key; keys from older or foreign
    /// layouts are skipped. Returns the number of keys seeded by this
    /// call.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store becomes
    /// unreachable mid-sweep. Keys already applied stay recorded in the
    /// seen set, so a retry resumes without double-counting.
    pub async fn restore_labeled(&self) -> Result<usize, PipelineError> {
        // Held across the sweep: serializes concurrent restoration passes
        // so the seen set cannot race.
        let mut seen = self.seen.lock().await;
        let mut seeded = 0;

        for family in names::labeled_counter_families() {
            let pattern = format!("{}:*", family.name);
            let keys = self.kv.scan_keys(&pattern).await?;
            for key in keys {
                if seen.contains(&key) {
                    continue;
                }
                let Some(parsed) = CounterKey::parse(&key, family.name, family.labels) else {
                    tracing::debug!(key, "checkpoint key missing required labels; skipped");
                    continue;
                };
                let Some(value) = self.kv.get_counter(&key).await? else {
                    continue;
                };
                let pairs = parsed.label_pairs();
                self.metrics.increment(family.name, &pairs, value);
                seen.insert(key);
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Seeds each global counter from its single fixed key, when present.
    /// Returns the number of counters seeded by this call.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Cache`] when the store is unreachable.
    pub async fn restore_globals(&self) -> Result<usize, PipelineError> {
        let mut seen = self.seen.lock().await;
        let mut seeded = 0;

        for family in names::global_counter_families() {
            if seen.contains(family.name) {
                continue;
            }
            let Some(value) = self.kv.get_counter(family.name).await? else {
                continue;
            };
            self.metrics.increment(family.name, &[], value);
            seen.insert(family.name.to_string());
            seeded += 1;
        }
        Ok(seeded)
    }
}

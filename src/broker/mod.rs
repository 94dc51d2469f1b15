//! Broker seam: topic names, the delivery type, and an in-process
//! channel-backed broker.
//!
//! The pipeline consumes from named topics under one consumer group with
//! at-least-once, per-topic-ordered delivery. [`ChannelBroker`] models
//! that contract over a `tokio::mpsc` channel: a single subscribe call
//! claims the consumer group and returns the receiver the dispatcher
//! drains; publishing with no consumer attached drops the message
//! (best-effort, logged).

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::error::PipelineError;
use crate::metrics::{MetricsRegistry, names};

/// Topic carrying stock mutations (added/updated/removed/purchased,
/// rebalance).
pub const STOCK_EVENTS: &str = "stock-events";
/// Topic carrying low-stock alerts.
pub const STOCK_ALERTS: &str = "stock-alerts";
/// Topic carrying store mutations (added/updated/removed).
pub const STORE_EVENTS: &str = "store-events";

/// Every topic the dispatcher subscribes to at startup.
pub const ALL_TOPICS: &[&str] = &[STOCK_EVENTS, STOCK_ALERTS, STORE_EVENTS];

/// One message as delivered to the consumer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload bytes (expected to be JSON, but not guaranteed).
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct ConsumerSlot {
    topics: Vec<String>,
    sender: Option<mpsc::Sender<Delivery>>,
}

/// In-process broker with single-consumer-group semantics.
#[derive(Debug)]
pub struct ChannelBroker {
    capacity: usize,
    metrics: Arc<dyn MetricsRegistry>,
    consumer: Mutex<ConsumerSlot>,
}

impl ChannelBroker {
    /// Creates a broker whose delivery channel holds up to `capacity`
    /// in-flight messages.
    #[must_use]
    pub fn new(capacity: usize, metrics: Arc<dyn MetricsRegistry>) -> Self {
        Self {
            capacity,
            metrics,
            consumer: Mutex::new(ConsumerSlot::default()),
        }
    }

    /// Claims the consumer group for the given topics and returns the
    /// delivery receiver.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError::Broker`] when a consumer is already
    /// attached — the broker models exactly one consumer group, and a
    /// second subscription is a startup wiring bug, which is why the
    /// caller is expected to treat it as fatal.
    pub fn subscribe(&self, topics: &[&str]) -> Result<mpsc::Receiver<Delivery>, PipelineError> {
        let mut slot = self
            .consumer
            .lock()
            .map_err(|_| PipelineError::Broker("consumer slot poisoned".to_string()))?;
        if slot.sender.is_some() {
            return Err(PipelineError::Broker(
                "consumer group already subscribed".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        slot.topics = topics.iter().map(|t| (*t).to_string()).collect();
        slot.sender = Some(tx);
        tracing::info!(?topics, "consumer group subscribed");
        Ok(rx)
    }

    /// Publishes a payload to a topic.
    ///
    /// Always counts the message as produced. Returns `true` when a
    /// subscribed consumer accepted it; messages for unsubscribed topics
    /// or a full/closed channel are dropped with a log line.
    pub fn publish(&self, topic: &str, payload: Vec<u8>) -> bool {
        self.metrics
            .increment(names::KAFKA_MESSAGES_PRODUCED_TOTAL, &[], 1.0);

        let Ok(slot) = self.consumer.lock() else {
            tracing::warn!(topic, "consumer slot poisoned; message dropped");
            return false;
        };
        let Some(sender) = slot.sender.as_ref() else {
            tracing::debug!(topic, "no consumer attached; message dropped");
            return false;
        };
        if !slot.topics.iter().any(|t| t == topic) {
            tracing::debug!(topic, "topic not subscribed; message dropped");
            return false;
        }
        match sender.try_send(Delivery {
            topic: topic.to_string(),
            payload,
        }) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(topic, error = %err, "delivery channel rejected message");
                false
            }
        }
    }
}

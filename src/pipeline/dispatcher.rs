//! Event dispatcher: the single consumer loop.
//!
//! Drains the delivery channel strictly sequentially — one message is
//! processed to completion before the next is taken, which is what
//! preserves per-topic delivery order. Message-level failures (bad JSON,
//! write failures) are logged and never stop the loop; only the channel
//! closing ends it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::broker::{self, Delivery};
use crate::cache::{KeyValueStore, activity_key};
use crate::domain::StockEvent;
use crate::error::PipelineError;
use crate::persistence::{EventLog, models::NewLogRecord};

use super::handlers;

/// Consumes deliveries and applies the audit-log and cache side effects.
#[derive(Debug)]
pub struct EventDispatcher {
    event_log: Arc<dyn EventLog>,
    kv: Arc<dyn KeyValueStore>,
}

impl EventDispatcher {
    /// Creates a dispatcher over the given stores.
    #[must_use]
    pub fn new(event_log: Arc<dyn EventLog>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { event_log, kv }
    }

    /// Runs the consumer loop until the delivery channel closes.
    pub async fn run(self, mut deliveries: mpsc::Receiver<Delivery>) {
        tracing::info!("event dispatcher started");
        while let Some(delivery) = deliveries.recv().await {
            self.process(&delivery).await;
        }
        tracing::info!("delivery channel closed; event dispatcher stopping");
    }

    /// Processes one delivery end to end.
    ///
    /// Never returns an error: every failure mode is logged and absorbed
    /// so the loop can continue with the next message.
    pub async fn process(&self, delivery: &Delivery) {
        let payload: serde_json::Value = match serde_json::from_slice(&delivery.payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    topic = %delivery.topic,
                    error = %err,
                    raw = %String::from_utf8_lossy(&delivery.payload),
                    "undecodable message payload; skipping"
                );
                return;
            }
        };

        let event: StockEvent = match serde_json::from_value(payload.clone()) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    topic = %delivery.topic,
                    error = %err,
                    raw = %payload,
                    "payload is not an event object; skipping"
                );
                return;
            }
        };

        match delivery.topic.as_str() {
            broker::STOCK_EVENTS => handlers::handle_stock_event(&event),
            broker::STOCK_ALERTS => handlers::handle_stock_alert(&event),
            broker::STORE_EVENTS => handlers::handle_store_event(&event),
            other => {
                tracing::warn!(topic = other, "message on unknown topic ignored");
                return;
            }
        }

        if let Err(err) = self.record(delivery, &event, payload).await {
            tracing::warn!(
                topic = %delivery.topic,
                event_type = %event.event,
                error = %err,
                "audit/cache write failed for consumed event"
            );
        }
    }

    /// Persists the audit row and, when a store id is derivable, the
    /// bounded activity entry.
    async fn record(
        &self,
        delivery: &Delivery,
        event: &StockEvent,
        payload: serde_json::Value,
    ) -> Result<(), PipelineError> {
        let record = NewLogRecord {
            topic: delivery.topic.clone(),
            event_type: event.event.clone(),
            store_id: event.derived_store_id(),
            stock_id: event.stock_id_for_log(),
            admin_email: event.admin_email.clone(),
            payload: payload.clone(),
        };
        self.event_log.insert_event(record).await?;

        match event.derived_store_id() {
            Some(store_id) => {
                let entry = activity_entry(&delivery.topic, payload);
                self.kv
                    .push_activity(&activity_key(store_id), &entry.to_string())
                    .await?;
            }
            None => {
                tracing::warn!(
                    topic = %delivery.topic,
                    event_type = %event.event,
                    "no store identifier in payload; skipping activity cache write"
                );
            }
        }
        Ok(())
    }
}

/// Builds the recent-activity snapshot: the raw payload plus the source
/// topic, stamped at dispatch time when the producer sent no timestamp.
fn activity_entry(topic: &str, mut payload: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut payload {
        map.insert(
            "topic".to_string(),
            serde_json::Value::String(topic.to_string()),
        );
        if !map.contains_key("timestamp") {
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
        }
    }
    payload
}

//! Structured counter keys for the durable checkpoint store.
//!
//! Checkpoints are keyed by `<metric-name>:<label>=<value>:…` with label
//! segments in canonical (sorted-by-key) order. In-memory code works with
//! [`CounterKey`] and only serializes at the storage boundary; raw key
//! strings are parsed back exactly once, during restoration.

use std::collections::BTreeMap;

/// A metric name plus its label set, in canonical order.
///
/// `BTreeMap` keeps the labels sorted by key, so [`CounterKey::encode`]
/// is deterministic for a given label combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterKey {
    /// Metric family name, e.g. `stocks_added_total`.
    pub name: String,
    /// Label key/value pairs; empty for global counters.
    pub labels: BTreeMap<String, String>,
}

impl CounterKey {
    /// Serializes to the durable-store key form.
    ///
    /// Global counters (no labels) encode as the bare metric name.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut key = self.name.clone();
        for (label, value) in &self.labels {
            key.push(':');
            key.push_str(label);
            key.push('=');
            key.push_str(value);
        }
        key
    }

    /// Parses the label portion of a stored key against a required label
    /// set.
    ///
    /// Strips `<name>:` from `key`, splits the remainder into `key=value`
    /// segments, and keeps only segments whose label key appears in
    /// `required`. Returns the parsed key when every required label was
    /// present and recognized; returns `None` when the key does not match
    /// `name`, or when the recognized-label count differs from
    /// `required.len()` (a missing required label means the key belongs
    /// to an older or foreign layout and must be skipped).
    #[must_use]
    pub fn parse(key: &str, name: &str, required: &[&str]) -> Option<Self> {
        let rest = if key == name {
            ""
        } else {
            key.strip_prefix(name)?.strip_prefix(':')?
        };

        let mut labels = BTreeMap::new();
        for segment in rest.split(':').filter(|s| !s.is_empty()) {
            let (label, value) = segment.split_once('=')?;
            if required.contains(&label) {
                labels.insert(label.to_string(), value.to_string());
            }
        }

        if labels.len() == required.len() {
            Some(Self {
                name: name.to_string(),
                labels,
            })
        } else {
            None
        }
    }

    /// Returns the labels as `(key, value)` string-slice pairs.
    #[must_use]
    pub fn label_pairs(&self) -> Vec<(&str, &str)> {
        self.labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn key(name: &str, labels: &[(&str, &str)]) -> CounterKey {
        CounterKey {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn encode_orders_labels_canonically() {
        let key = key(
            "stocks_added_total",
            &[("store_id", "5"), ("admin_email", "a@x.com")],
        );
        assert_eq!(
            key.encode(),
            "stocks_added_total:admin_email=a@x.com:store_id=5"
        );
    }

    #[test]
    fn encode_global_counter_is_bare_name() {
        let key = key("redis_cache_hits_total", &[]);
        assert_eq!(key.encode(), "redis_cache_hits_total");
    }

    #[test]
    fn parse_round_trips() {
        let original = key(
            "stocks_added_total",
            &[("admin_email", "a@x.com"), ("store_id", "5")],
        );
        let parsed = CounterKey::parse(
            &original.encode(),
            "stocks_added_total",
            &["admin_email", "store_id"],
        );
        assert_eq!(parsed, Some(original));
    }

    #[test]
    fn parse_rejects_missing_required_label() {
        let parsed = CounterKey::parse(
            "stocks_added_total:admin_email=a@x.com",
            "stocks_added_total",
            &["admin_email", "store_id"],
        );
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_ignores_unrecognized_labels() {
        let parsed = CounterKey::parse(
            "stocks_added_total:admin_email=a@x.com:region=eu:store_id=5",
            "stocks_added_total",
            &["admin_email", "store_id"],
        );
        let Some(parsed) = parsed else {
            panic!("key with extra labels should still parse");
        };
        assert_eq!(parsed.labels.len(), 2);
        assert!(!parsed.labels.contains_key("region"));
    }

    #[test]
    fn parse_rejects_foreign_metric_name() {
        let parsed = CounterKey::parse(
            "stores_added_total:admin_email=a@x.com",
            "stocks_added_total",
            &["admin_email"],
        );
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_bare_name_for_global_counter() {
        let parsed = CounterKey::parse("kafka_messages_produced_total", "kafka_messages_produced_total", &[]);
        let Some(parsed) = parsed else {
            panic!("bare global key should parse");
        };
        assert!(parsed.labels.is_empty());
    }
}

//! Inventory events as they appear on the broker wire.
//!
//! Producers publish loosely-schemed JSON: only the `event` discriminator
//! is expected, and every other field depends on the kind. Deserialization
//! is deliberately tolerant — a payload with a missing discriminator or a
//! string-encoded numeric id still parses, so the dispatcher can log and
//! audit it rather than drop it.

use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of recognized event kinds.
///
/// The wire discriminator is free-form; anything outside this set is
/// reported as an unknown kind by the handlers and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A stock item was created.
    StockAdded,
    /// A stock item was updated (name, price, or quantity).
    StockUpdated,
    /// A stock item was deleted.
    StockRemoved,
    /// A customer purchased stock.
    StockPurchased,
    /// The rebalancer moved stock between stores.
    Rebalance,
    /// A stock item fell below its low-stock threshold.
    LowStock,
    /// A store was created.
    StoreAdded,
    /// A store was updated.
    StoreUpdated,
    /// A store was deleted.
    StoreRemoved,
}

impl EventKind {
    /// Parses a wire discriminator into a kind, if recognized.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stock-added" => Some(Self::StockAdded),
            "stock-updated" => Some(Self::StockUpdated),
            "stock-removed" => Some(Self::StockRemoved),
            "stock-purchased" => Some(Self::StockPurchased),
            "rebalance" => Some(Self::Rebalance),
            "LOW_STOCK" => Some(Self::LowStock),
            "store-added" => Some(Self::StoreAdded),
            "store-updated" => Some(Self::StoreUpdated),
            "store-removed" => Some(Self::StoreRemoved),
            _ => None,
        }
    }

    /// Returns the wire discriminator for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StockAdded => "stock-added",
            Self::StockUpdated => "stock-updated",
            Self::StockRemoved => "stock-removed",
            Self::StockPurchased => "stock-purchased",
            Self::Rebalance => "rebalance",
            Self::LowStock => "LOW_STOCK",
            Self::StoreAdded => "store-added",
            Self::StoreUpdated => "store-updated",
            Self::StoreRemoved => "store-removed",
        }
    }
}

/// An inventory event as delivered on a broker topic.
///
/// All fields except `event` are kind-dependent and optional. Numeric
/// identifiers accept both JSON numbers and numeric strings, since
/// producers are not consistent about which they send. Alternate field
/// spellings (`storeId`, `stock_id`) are separate fields rather than
/// serde aliases: an alias turns a payload carrying both spellings into
/// a duplicate-field parse error, and such payloads must still be
/// consumed. The precedence chain lives in [`StockEvent::explicit_store_id`]
/// and [`StockEvent::item_id`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockEvent {
    /// Wire discriminator; empty when the producer omitted it.
    #[serde(default)]
    pub event: String,

    /// Store the event applies to.
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub store_id: Option<i64>,

    /// Camel-case spelling of the store identifier some producers send,
    /// possibly alongside `store_id`.
    #[serde(
        default,
        rename = "storeId",
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub store_id_camel: Option<i64>,

    /// Stock item identifier for stock events; store identifier for
    /// store events (store producers send it as `id`).
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,

    /// Explicit `stock_id` spelling some producers send instead of `id`.
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock_id: Option<i64>,

    /// Email of the admin who triggered the mutation.
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Item or store display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Quantity after the mutation.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: Option<i64>,

    /// Unit price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    /// Units purchased (purchase events only).
    #[serde(default, deserialize_with = "lenient_i64")]
    pub purchased_quantity: Option<i64>,

    /// Producer-side timestamp; format is producer-dependent (epoch
    /// millis or an ISO string), so it is carried opaquely.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl StockEvent {
    /// Parses the wire discriminator into a recognized kind.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_name(&self.event)
    }

    /// Returns the explicitly-supplied store identifier: `store_id`
    /// first, then the `storeId` spelling.
    #[must_use]
    pub const fn explicit_store_id(&self) -> Option<i64> {
        match self.store_id {
            Some(id) => Some(id),
            None => self.store_id_camel,
        }
    }

    /// Returns the item identifier: `id` first, then the `stock_id`
    /// spelling.
    #[must_use]
    pub const fn item_id(&self) -> Option<i64> {
        match self.id {
            Some(id) => Some(id),
            None => self.stock_id,
        }
    }

    /// Derives the store identifier for the activity cache key.
    ///
    /// Derivation order: `store_id`, then `storeId`, then `id` — first
    /// non-null wins. Store producers send their own identifier as `id`,
    /// which is why the final fallback exists.
    #[must_use]
    pub const fn derived_store_id(&self) -> Option<i64> {
        match self.explicit_store_id() {
            Some(id) => Some(id),
            None => self.item_id(),
        }
    }

    /// Returns the item identifier as a stock id for the audit log.
    ///
    /// Only meaningful when an explicit store identifier accompanied it;
    /// otherwise `id` has already been consumed as the store identifier
    /// and recording it as a stock id would mislabel store events.
    #[must_use]
    pub const fn stock_id_for_log(&self) -> Option<i64> {
        if self.explicit_store_id().is_some() {
            self.item_id()
        } else {
            None
        }
    }
}

/// Deserializes an optional integer from a JSON number or numeric string.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

/// Deserializes an optional float from a JSON number or numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(json: &str) -> StockEvent {
        let Ok(event) = serde_json::from_str::<StockEvent>(json) else {
            panic!("event should parse");
        };
        event
    }

    #[test]
    fn parses_full_stock_added() {
        let event = parse(
            r#"{"event":"stock-added","store_id":5,"id":12,"name":"Widget",
                "quantity":3,"price":9.99,"admin_email":"a@x.com"}"#,
        );
        assert_eq!(event.kind(), Some(EventKind::StockAdded));
        assert_eq!(event.store_id, Some(5));
        assert_eq!(event.id, Some(12));
        assert_eq!(event.derived_store_id(), Some(5));
        assert_eq!(event.stock_id_for_log(), Some(12));
    }

    #[test]
    fn camel_case_store_id_spelling() {
        let event = parse(r#"{"event":"stock-updated","storeId":7,"id":3}"#);
        assert_eq!(event.explicit_store_id(), Some(7));
        assert_eq!(event.derived_store_id(), Some(7));
        assert_eq!(event.stock_id_for_log(), Some(3));
    }

    #[test]
    fn both_store_id_spellings_parse_with_snake_precedence() {
        let event = parse(r#"{"event":"stock-added","store_id":5,"storeId":6,"id":12}"#);
        assert_eq!(event.explicit_store_id(), Some(5));
        assert_eq!(event.derived_store_id(), Some(5));
        assert_eq!(event.stock_id_for_log(), Some(12));
    }

    #[test]
    fn explicit_stock_id_spelling_parses() {
        let event = parse(r#"{"event":"stock-removed","store_id":5,"id":12,"stock_id":13}"#);
        assert_eq!(event.item_id(), Some(12));
        assert_eq!(event.stock_id_for_log(), Some(12));
    }

    #[test]
    fn string_encoded_ids_parse() {
        let event = parse(r#"{"event":"stock-removed","store_id":"5","id":"12"}"#);
        assert_eq!(event.store_id, Some(5));
        assert_eq!(event.id, Some(12));
    }

    #[test]
    fn store_event_derives_store_from_id() {
        let event = parse(r#"{"event":"store-added","id":9,"name":"Corner Shop"}"#);
        assert_eq!(event.derived_store_id(), Some(9));
        // `id` was consumed as the store identifier, not a stock id.
        assert_eq!(event.stock_id_for_log(), None);
    }

    #[test]
    fn missing_discriminator_is_unknown_not_error() {
        let event = parse(r#"{"store_id":1}"#);
        assert_eq!(event.event, "");
        assert_eq!(event.kind(), None);
    }

    #[test]
    fn unknown_kind_is_none() {
        let event = parse(r#"{"event":"price-frozen"}"#);
        assert_eq!(event.kind(), None);
    }

    #[test]
    fn all_kinds_round_trip_through_names() {
        let kinds = [
            EventKind::StockAdded,
            EventKind::StockUpdated,
            EventKind::StockRemoved,
            EventKind::StockPurchased,
            EventKind::Rebalance,
            EventKind::LowStock,
            EventKind::StoreAdded,
            EventKind::StoreUpdated,
            EventKind::StoreRemoved,
        ];
        for kind in kinds {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
        }
    }
}

//! Per-topic event handlers.
//!
//! Handlers are synchronous and side-effect-free with respect to
//! persistence: they emit the human-readable trace for an event and
//! nothing else. The dispatcher performs the audit-log and cache writes
//! afterwards, whether or not the kind was recognized. A handler never
//! fails: an unrecognized kind is logged as such and ignored.

use crate::domain::{EventKind, StockEvent};

/// Handles a message from the stock-events topic.
pub(crate) fn handle_stock_event(event: &StockEvent) {
    match event.kind() {
        Some(EventKind::StockAdded) => tracing::info!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            name = ?event.name,
            quantity = ?event.quantity,
            admin_email = ?event.admin_email,
            "stock added"
        ),
        Some(EventKind::StockUpdated) => tracing::info!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            name = ?event.name,
            quantity = ?event.quantity,
            "stock updated"
        ),
        Some(EventKind::StockRemoved) => tracing::info!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            "stock removed"
        ),
        Some(EventKind::StockPurchased) => tracing::info!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            purchased_quantity = ?event.purchased_quantity,
            price = ?event.price,
            "stock purchased"
        ),
        Some(EventKind::Rebalance) => tracing::info!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            quantity = ?event.quantity,
            "rebalance applied"
        ),
        Some(other) => tracing::info!(kind = other.as_str(), "event routed to stock handler"),
        None => tracing::warn!(kind = %event.event, "unknown event type"),
    }
}

/// Handles a message from the stock-alerts topic.
pub(crate) fn handle_stock_alert(event: &StockEvent) {
    match event.kind() {
        Some(EventKind::LowStock) => tracing::warn!(
            store_id = ?event.explicit_store_id(),
            stock_id = ?event.item_id(),
            name = ?event.name,
            quantity = ?event.quantity,
            "low stock alert"
        ),
        Some(other) => tracing::info!(kind = other.as_str(), "event routed to alert handler"),
        None => tracing::warn!(kind = %event.event, "unknown event type"),
    }
}

/// Handles a message from the store-events topic.
pub(crate) fn handle_store_event(event: &StockEvent) {
    match event.kind() {
        Some(EventKind::StoreAdded) => tracing::info!(
            store_id = ?event.derived_store_id(),
            name = ?event.name,
            admin_email = ?event.admin_email,
            "store added"
        ),
        Some(EventKind::StoreUpdated) => tracing::info!(
            store_id = ?event.derived_store_id(),
            name = ?event.name,
            "store updated"
        ),
        Some(EventKind::StoreRemoved) => tracing::info!(
            store_id = ?event.derived_store_id(),
            "store removed"
        ),
        Some(other) => tracing::info!(kind = other.as_str(), "event routed to store handler"),
        None => tracing::warn!(kind = %event.event, "unknown event type"),
    }
}

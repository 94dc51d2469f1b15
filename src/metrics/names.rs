//! Metric family names, help texts, and label layouts.
//!
//! Every family the pipeline touches is declared here and pre-registered
//! at startup; nothing registers metrics dynamically. The same tables
//! drive registration, restoration, and checkpoint flushing, so the three
//! can never disagree about a family's label keys.

/// Stock items created, by admin and store.
pub const STOCKS_ADDED_TOTAL: &str = "stocks_added_total";
/// Stock items updated, by admin and store.
pub const STOCKS_UPDATED_TOTAL: &str = "stocks_updated_total";
/// Stock items removed, by admin and store.
pub const STOCKS_REMOVED_TOTAL: &str = "stocks_removed_total";
/// Stock purchase events, by admin and store.
pub const STOCKS_PURCHASED_TOTAL: &str = "stocks_purchased_total";
/// Revenue from purchases, by admin and store.
pub const SALES_REVENUE_TOTAL: &str = "sales_revenue_total";
/// Low-stock alerts raised, by admin and store.
pub const LOW_STOCK_ALERTS_TOTAL: &str = "low_stock_alerts_total";
/// Stores created, by admin.
pub const STORES_ADDED_TOTAL: &str = "stores_added_total";
/// Stores updated, by admin.
pub const STORES_UPDATED_TOTAL: &str = "stores_updated_total";
/// Stores removed, by admin.
pub const STORES_REMOVED_TOTAL: &str = "stores_removed_total";
/// Recent-activity cache reads that found entries.
pub const REDIS_CACHE_HITS_TOTAL: &str = "redis_cache_hits_total";
/// Recent-activity cache reads that found nothing.
pub const REDIS_CACHE_MISSES_TOTAL: &str = "redis_cache_misses_total";
/// Messages published to broker topics.
pub const KAFKA_MESSAGES_PRODUCED_TOTAL: &str = "kafka_messages_produced_total";
/// Current total stock quantity per store (point-in-time).
pub const STORE_STOCK_QUANTITY: &str = "store_stock_quantity";

/// Static description of a counter family.
#[derive(Debug, Clone, Copy)]
pub struct CounterFamily {
    /// Metric name.
    pub name: &'static str,
    /// Help text for the exposition.
    pub help: &'static str,
    /// Label keys, in registration order; empty for global counters.
    pub labels: &'static [&'static str],
}

/// Static description of a gauge family.
#[derive(Debug, Clone, Copy)]
pub struct GaugeFamily {
    /// Metric name.
    pub name: &'static str,
    /// Help text for the exposition.
    pub help: &'static str,
    /// Label keys, in registration order.
    pub labels: &'static [&'static str],
}

/// All counter families, labeled and global.
pub const COUNTER_FAMILIES: &[CounterFamily] = &[
    CounterFamily {
        name: STOCKS_ADDED_TOTAL,
        help: "Total stock items added",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: STOCKS_UPDATED_TOTAL,
        help: "Total stock items updated",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: STOCKS_REMOVED_TOTAL,
        help: "Total stock items removed",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: STOCKS_PURCHASED_TOTAL,
        help: "Total stock purchase events",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: SALES_REVENUE_TOTAL,
        help: "Total revenue from stock purchases",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: LOW_STOCK_ALERTS_TOTAL,
        help: "Total low-stock alerts raised",
        labels: &["admin_email", "store_id"],
    },
    CounterFamily {
        name: STORES_ADDED_TOTAL,
        help: "Total stores added",
        labels: &["admin_email"],
    },
    CounterFamily {
        name: STORES_UPDATED_TOTAL,
        help: "Total stores updated",
        labels: &["admin_email"],
    },
    CounterFamily {
        name: STORES_REMOVED_TOTAL,
        help: "Total stores removed",
        labels: &["admin_email"],
    },
    CounterFamily {
        name: REDIS_CACHE_HITS_TOTAL,
        help: "Total recent-activity cache hits",
        labels: &[],
    },
    CounterFamily {
        name: REDIS_CACHE_MISSES_TOTAL,
        help: "Total recent-activity cache misses",
        labels: &[],
    },
    CounterFamily {
        name: KAFKA_MESSAGES_PRODUCED_TOTAL,
        help: "Total messages produced to broker topics",
        labels: &[],
    },
];

/// All gauge families.
pub const GAUGE_FAMILIES: &[GaugeFamily] = &[GaugeFamily {
    name: STORE_STOCK_QUANTITY,
    help: "Current total stock quantity per store",
    labels: &["store_id", "store_name"],
}];

/// Counter families restored per-key from the durable store (labeled).
pub fn labeled_counter_families() -> impl Iterator<Item = &'static CounterFamily> {
    COUNTER_FAMILIES.iter().filter(|f| !f.labels.is_empty())
}

/// Counter families restored from a single fixed key (global).
pub fn global_counter_families() -> impl Iterator<Item = &'static CounterFamily> {
    COUNTER_FAMILIES.iter().filter(|f| f.labels.is_empty())
}

//! Domain layer: event wire types and the canonical counter-key form.
//!
//! This module contains the types shared by every pipeline component:
//! the inventory event as it appears on the broker, the closed set of
//! recognized event kinds, and the structured counter key used at the
//! durable-store boundary.

pub mod counter_key;
pub mod event;

pub use counter_key::CounterKey;
pub use event::{EventKind, StockEvent};

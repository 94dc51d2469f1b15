//! Pipeline core: consumer loop, restoration, and the periodic jobs.
//!
//! The dispatcher owns the consume→handle→persist cycle; the restorer
//! re-seeds counters once at startup; the gauge refresh and counter
//! flush jobs tick independently. Each runs as its own spawned task with
//! its own error boundary, so a failure in one never affects the others.

pub mod dispatcher;
pub mod flush;
pub mod gauge_refresh;
mod handlers;
pub mod restore;

pub use dispatcher::EventDispatcher;
pub use flush::CounterFlushJob;
pub use gauge_refresh::GaugeRefreshJob;
pub use restore::CounterRestorer;

//! stockpulse server entry point.
//!
//! Wires the broker consumer, background jobs, and the operational HTTP
//! surface, then serves until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stockpulse::api;
use stockpulse::app_state::AppState;
use stockpulse::broker::{ALL_TOPICS, ChannelBroker};
use stockpulse::cache::{KeyValueStore, RedisKvStore};
use stockpulse::config::PipelineConfig;
use stockpulse::metrics::{MetricsRegistry, PrometheusMetrics};
use stockpulse::persistence::{EventLog, PostgresStore, StockCatalog};
use stockpulse::pipeline::{CounterFlushJob, CounterRestorer, EventDispatcher, GaugeRefreshJob};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = PipelineConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting stockpulse");

    // Metric registry
    let metrics = Arc::new(PrometheusMetrics::new()?);

    // Durable stores
    let postgres = Arc::new(PostgresStore::connect(&config).await?);
    postgres.migrate().await?;
    let kv: Arc<dyn KeyValueStore> = Arc::new(
        RedisKvStore::connect(&config.redis_url, config.redis_max_connections).await?,
    );

    // Broker consumer: the single consumer group must attach before
    // anything publishes, and a second subscription is a wiring bug.
    let broker = Arc::new(ChannelBroker::new(
        config.broker_channel_capacity,
        Arc::clone(&metrics) as Arc<dyn MetricsRegistry>,
    ));
    let deliveries = broker.subscribe(ALL_TOPICS)?;

    let dispatcher = EventDispatcher::new(
        Arc::clone(&postgres) as Arc<dyn EventLog>,
        Arc::clone(&kv),
    );
    tokio::spawn(dispatcher.run(deliveries));

    // Counter restoration runs once, after its warmup, then the task ends.
    let restorer = CounterRestorer::new(
        Arc::clone(&kv),
        Arc::clone(&metrics) as Arc<dyn MetricsRegistry>,
        &config,
    );
    tokio::spawn(async move {
        restorer.run().await;
    });

    let gauge_job = GaugeRefreshJob::new(
        Arc::clone(&postgres) as Arc<dyn StockCatalog>,
        Arc::clone(&metrics) as Arc<dyn MetricsRegistry>,
        Duration::from_secs(config.gauge_refresh_interval_secs),
    );
    tokio::spawn(gauge_job.run());

    let flush_job = CounterFlushJob::new(
        Arc::clone(&kv),
        Arc::clone(&metrics) as Arc<dyn MetricsRegistry>,
        Duration::from_secs(config.flush_interval_secs),
    );
    tokio::spawn(flush_job.run());

    // Build application state
    let app_state = AppState {
        metrics,
        kv,
        broker,
    };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

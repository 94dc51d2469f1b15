//! Operational API: health, metrics exposition, activity reads, and the
//! event ingest bridge.
//!
//! This surface is operational, not user-facing: its consumers are
//! scrapers, dashboards, and the out-of-scope route layer that bridges
//! mutations into the broker.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;
use crate::broker::ALL_TOPICS;
use crate::cache::{RECENT_ACTIVITY_LIMIT, activity_key};
use crate::error::PipelineError;
use crate::metrics::{MetricsRegistry, names};

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /metrics` — Prometheus text exposition.
///
/// # Errors
///
/// Returns a [`PipelineError::Metrics`] when encoding fails.
pub async fn metrics_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PipelineError> {
    let body = state.metrics.encode_text()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

/// `GET /stores/{store_id}/activity` — bounded recent-activity list for
/// one store, most recent first.
///
/// Counts a cache hit when the list has entries and a miss when it is
/// empty.
///
/// # Errors
///
/// Returns a [`PipelineError::Cache`] when the key-value store is
/// unreachable.
pub async fn activity_handler(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<Vec<serde_json::Value>>, PipelineError> {
    let entries = state
        .kv
        .recent_activity(&activity_key(store_id), RECENT_ACTIVITY_LIMIT)
        .await?;

    if entries.is_empty() {
        state.metrics.increment(names::REDIS_CACHE_MISSES_TOTAL, &[], 1.0);
    } else {
        state.metrics.increment(names::REDIS_CACHE_HITS_TOTAL, &[], 1.0);
    }

    let parsed = entries
        .iter()
        .map(|entry| {
            serde_json::from_str(entry)
                .unwrap_or_else(|_| serde_json::Value::String(entry.clone()))
        })
        .collect();
    Ok(Json(parsed))
}

/// Ingest response: whether a consumer accepted the message.
#[derive(Debug, Serialize)]
struct IngestResponse {
    delivered: bool,
}

/// `POST /topics/{topic}/events` — publishes a raw JSON payload to a
/// broker topic on behalf of the out-of-scope route layer.
///
/// # Errors
///
/// Returns a [`PipelineError::InvalidRequest`] for a topic the pipeline
/// does not consume.
pub async fn ingest_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, PipelineError> {
    if !ALL_TOPICS.contains(&topic.as_str()) {
        return Err(PipelineError::InvalidRequest(format!(
            "unknown topic: {topic}"
        )));
    }
    let delivered = state.broker.publish(&topic, body.to_vec());
    Ok((StatusCode::ACCEPTED, Json(IngestResponse { delivered })))
}

/// Builds the complete operational router.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/stores/{store_id}/activity", get(activity_handler))
        .route("/topics/{topic}/events", post(ingest_handler))
}

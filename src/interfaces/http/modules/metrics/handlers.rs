//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` returning Prometheus text format rendered from the
//! injected [`MetricsRegistry`].

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::infrastructure::MetricsRegistry;

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub registry: MetricsRegistry,
}

/// `GET /metrics` — Prometheus scrape endpoint (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.registry.render();
    (
        StatusCode::OK,
        [("content-type", PROMETHEUS_CONTENT_TYPE)],
        body,
    )
}

//! HTTP router
//!
//! `POST /` simulated login, `GET /metrics` Prometheus scrape, `GET /health`.
//! Every other method or path falls through to the login handler.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AuthConfig;
use crate::infrastructure::MetricsRegistry;

use super::modules::auth::{self, AuthState};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{self, MetricsState};
use super::modules::request_id::request_id_middleware;

/// Unified router state. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub metrics: MetricsRegistry,
    pub success_threshold: f32,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(metrics: MetricsRegistry, auth: &AuthConfig) -> Self {
        Self {
            metrics,
            success_threshold: auth.success_threshold,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState {
            metrics: s.metrics.clone(),
            success_threshold: s.success_threshold,
        }
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        MetricsState {
            registry: s.metrics.clone(),
        }
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        HealthState {
            started_at: Arc::clone(&s.started_at),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(auth::authenticate))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/health", get(health::health_check))
        .fallback(auth::authenticate)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use super::*;
    use crate::config::MetricsConfig;

    fn app() -> Router {
        let metrics = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        create_router(AppState::new(metrics, &AuthConfig::default()))
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_login_then_scrape() {
        use tower::Service;
        let mut svc = app().into_service();

        let login = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"User":"Alkey"}"#))
            .unwrap();
        let resp = svc.call(login).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let outcome = body_text(resp).await;
        assert!(outcome == "200" || outcome == "401");

        let scrape = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let resp = svc.call(scrape).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let text = body_text(resp).await;
        let expected = format!(
            r#"http_request_get_user_status_count{{user="Alkey",status="{}"}} 1"#,
            outcome
        );
        assert!(text.lines().any(|l| l == expected), "missing {:?} in\n{}", expected, text);
        assert!(text
            .lines()
            .any(|l| l.starts_with("http_request_average_response_time_seconds ")));
    }

    #[tokio::test]
    async fn test_unmatched_requests_reach_login_handler() {
        use tower::Service;
        let mut svc = app().into_service();

        let req = Request::builder().uri("/login").body(Body::empty()).unwrap();
        let resp = svc.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let outcome = body_text(resp).await;
        assert!(outcome == "200" || outcome == "401");

        let scrape = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let text = body_text(svc.call(scrape).await.unwrap()).await;
        let expected = format!(
            r#"http_request_get_user_status_count{{user="",status="{}"}} 1"#,
            outcome
        );
        assert!(text.lines().any(|l| l == expected), "missing {:?} in\n{}", expected, text);
    }

    #[tokio::test]
    async fn test_health_route() {
        use tower::Service;
        let mut svc = app().into_service();

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = svc.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("\"status\":\"ok\""));
    }
}

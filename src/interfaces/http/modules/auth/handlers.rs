//! Simulated authentication handler
//!
//! `POST /` answers `200` or `401` in the body at random. The HTTP status is
//! always 200 OK and a bad body never produces an error response.

use std::time::Instant;

use axum::{body::Body, extract::State};
use tracing::info;

use crate::domain::{AuthRequest, AuthStatus};
use crate::infrastructure::MetricsRegistry;

/// Shared state for the auth endpoint
#[derive(Clone)]
pub struct AuthState {
    pub metrics: MetricsRegistry,
    pub success_threshold: f32,
}

/// `POST /` — simulated login
pub async fn authenticate(State(state): State<AuthState>, body: Body) -> &'static str {
    let mut outcome = OutcomeGuard::start(&state.metrics);

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let request = AuthRequest::decode(&bytes);
    let status = AuthStatus::draw(&mut rand::thread_rng(), state.success_threshold);

    info!(user = %request.user, %status, "{} {}", request.user, status);

    outcome.set_user(request.user);
    outcome.set_status(status);
    status.as_str()
}

/// Records latency and the (user, status) outcome when dropped, whichever way
/// the handler exits.
pub struct OutcomeGuard<'a> {
    metrics: &'a MetricsRegistry,
    started: Instant,
    user: String,
    status: Option<AuthStatus>,
}

impl<'a> OutcomeGuard<'a> {
    pub fn start(metrics: &'a MetricsRegistry) -> Self {
        Self {
            metrics,
            started: Instant::now(),
            user: String::new(),
            status: None,
        }
    }

    pub fn set_user(&mut self, user: String) {
        self.user = user;
    }

    pub fn set_status(&mut self, status: AuthStatus) {
        self.status = Some(status);
    }
}

impl Drop for OutcomeGuard<'_> {
    fn drop(&mut self) {
        self.metrics.record_latency(self.started.elapsed());
        let status = self.status.map(AuthStatus::as_str).unwrap_or_default();
        self.metrics.record_outcome(&self.user, status);
    }
}

//! Traffic generator
//!
//! Background task that keeps posting `{"User": ...}` bodies to the auth
//! endpoint, one every interval, with an identifier picked from a fixed pool.
//! Delivery errors and responses are discarded.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ProducerConfig;
use crate::domain::AuthRequest;
use crate::shared::errors::{AppError, ConfigError};
use crate::shared::shutdown::ShutdownSignal;

/// Fixed, non-empty set of user identifiers.
#[derive(Debug, Clone)]
pub struct UserPool {
    users: Vec<String>,
}

impl UserPool {
    pub fn new(users: Vec<String>) -> Result<Self, ConfigError> {
        if users.is_empty() {
            return Err(ConfigError::Invalid("user pool must not be empty".into()));
        }
        Ok(Self { users })
    }

    /// Uniform pick.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Non-empty by construction.
        self.users.choose(rng).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub struct TrafficGenerator {
    client: reqwest::Client,
    target: String,
    pool: UserPool,
    interval: Duration,
}

impl TrafficGenerator {
    pub fn new(config: &ProducerConfig, target: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            target: target.into(),
            pool: UserPool::new(config.users.clone())?,
            interval: Duration::from_millis(config.interval_ms),
        })
    }

    /// Run on a dedicated task. The handle yields the number of completed
    /// iterations once `shutdown` fires.
    pub fn spawn(self, shutdown: ShutdownSignal) -> JoinHandle<u64> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: ShutdownSignal) -> u64 {
        info!(
            target_url = %self.target,
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            users = self.pool.len(),
            "🚦 Traffic generator started"
        );

        let mut iterations = 0u64;
        while !shutdown.is_triggered() {
            let user = self.pool.choose(&mut rand::thread_rng()).to_owned();

            tokio::select! {
                _ = self.send(user) => {}
                _ = shutdown.notified().wait() => break,
            }
            iterations += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.notified().wait() => break,
            }
        }

        info!(iterations, "🚦 Traffic generator stopped");
        iterations
    }

    /// Fire-and-forget POST.
    async fn send(&self, user: String) {
        let _ = self
            .client
            .post(&self.target)
            .json(&AuthRequest::new(user))
            .send()
            .await;
    }
}

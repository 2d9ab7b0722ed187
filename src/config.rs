//! Configuration module
//!
//! Reads the application configuration from a TOML file
//! (default `~/.config/authsim/config.toml`). Every section and field is
//! optional; a missing file yields the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::auth::DEFAULT_SUCCESS_THRESHOLD;
use crate::shared::errors::ConfigError;

/// Identifiers the traffic generator picks from.
pub const DEFAULT_USER_POOL: [&str; 5] = ["Miras", "Meirkhan", "Alkey", "Meirkhan2.0", "Afton"];

pub const DEFAULT_OUTCOME_COUNTER: &str = "http_request_get_user_status_count";
pub const DEFAULT_LATENCY_GAUGE: &str = "http_request_average_response_time_seconds";

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("authsim")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub producer: ProducerConfig,
    pub auth: AuthConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for draining tasks on shutdown, in seconds
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            shutdown_timeout: 10,
        }
    }
}

/// Traffic generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    pub enabled: bool,
    /// Endpoint to POST to. `None` targets this server's own listener.
    pub target_url: Option<String>,
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
    pub users: Vec<String>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_url: None,
            interval_ms: 2000,
            request_timeout_ms: 5000,
            users: DEFAULT_USER_POOL.iter().map(|u| u.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// A draw strictly above this value yields "200".
    pub success_threshold: f32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

/// Exported metric names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub outcome_counter: String,
    pub latency_gauge: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            outcome_counter: DEFAULT_OUTCOME_COUNTER.to_string(),
            latency_gauge: DEFAULT_LATENCY_GAUGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producer.users.is_empty() {
            return Err(ConfigError::Invalid("producer.users must not be empty".into()));
        }
        if self.producer.interval_ms == 0 {
            return Err(ConfigError::Invalid("producer.interval_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.auth.success_threshold) {
            return Err(ConfigError::Invalid(format!(
                "auth.success_threshold must be within [0, 1], got {}",
                self.auth.success_threshold
            )));
        }
        if self.metrics.outcome_counter == self.metrics.latency_gauge {
            return Err(ConfigError::Invalid(
                "metrics.outcome_counter and metrics.latency_gauge must differ".into(),
            ));
        }
        Ok(())
    }

    /// URL the traffic generator posts to.
    pub fn producer_target(&self, port: u16) -> String {
        self.producer
            .target_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}/", port))
    }
}

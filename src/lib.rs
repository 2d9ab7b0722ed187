//! # authsim
//!
//! Simulated user-authentication endpoint with a synthetic traffic generator
//! and Prometheus metrics.
//!
//! ## Architecture
//!
//! - **domain**: request payload and the random auth outcome
//! - **application**: the traffic generator
//! - **infrastructure**: the metrics registry (private Prometheus recorder)
//! - **interfaces**: HTTP router and handlers
//! - **server**: lifecycle and logging bootstrap
//! - **shared**: errors and shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::MetricsRegistry;
pub use interfaces::http::create_router;
pub use server::{init_tracing, ServerHandle};

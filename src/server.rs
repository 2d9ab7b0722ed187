//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics registry, HTTP listener,
//! traffic generator and graceful shutdown. The binary and the integration
//! tests both start the service through it.

use std::net::SocketAddr;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::TrafficGenerator;
use crate::config::AppConfig;
use crate::infrastructure::MetricsRegistry;
use crate::interfaces::http::{create_router, AppState};
use crate::shared::errors::AppResult;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Handle to a running service.
///
/// # Examples
///
/// ```rust,no_run
/// use authsim::config::AppConfig;
/// use authsim::server::ServerHandle;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(AppConfig::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,

    local_addr: SocketAddr,
    metrics: MetricsRegistry,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    producer_task: Option<JoinHandle<u64>>,
}

impl ServerHandle {
    /// Start the service.
    ///
    /// This will:
    /// 1. Validate the configuration and register the metrics
    /// 2. Bind the HTTP listener and serve `/`, `/metrics` and `/health`
    /// 3. Start the traffic generator, unless disabled
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        info!("Starting authsim...");
        config.validate()?;

        // ── Metrics ────────────────────────────────────────────
        let metrics = MetricsRegistry::new(&config.metrics)?;
        info!(
            counter = %config.metrics.outcome_counter,
            gauge = %config.metrics.latency_gauge,
            "📊 Metrics registered"
        );

        // ── HTTP listener ──────────────────────────────────────
        let router = create_router(AppState::new(metrics.clone(), &config.auth));

        let addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local_addr);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal().notified();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 HTTP server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("HTTP server error: {}", e);
            }
        });

        // ── Traffic generator ──────────────────────────────────
        let producer_task = if config.producer.enabled {
            let target = config.producer_target(local_addr.port());
            let generator = TrafficGenerator::new(&config.producer, target)?;
            Some(generator.spawn(shutdown.signal()))
        } else {
            info!("Traffic generator disabled");
            None
        };

        info!("🚀 All services started.");

        Ok(Self {
            config,
            local_addr,
            metrics,
            shutdown,
            api_task,
            producer_task,
        })
    }

    /// Address the listener is bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Wait for the shutdown signal, then for every task to stop, bounded by
    /// `server.shutdown_timeout`.
    pub async fn wait(self) {
        let Self {
            shutdown,
            api_task,
            producer_task,
            ..
        } = self;

        shutdown
            .shutdown_with_cleanup(|| async move {
                if let Some(task) = producer_task {
                    match task.await {
                        Ok(iterations) => info!(iterations, "Traffic generator finished"),
                        Err(e) => error!("Traffic generator task panicked: {}", e),
                    }
                }
                match api_task.await {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => error!("HTTP server task panicked: {}", e),
                }
            })
            .await;

        info!("👋 authsim shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down authsim...");
        self.shutdown.signal().trigger();
        self.wait().await;
    }

    /// Check if the HTTP server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

//! authsim — simulated authentication service
//!
//! ```sh
//! # Run with default config (~/.config/authsim/config.toml)
//! authsim
//!
//! # Custom config path, different port, no synthetic traffic
//! authsim --config /etc/authsim/config.toml --port 9000 --no-producer
//!
//! # Validate config without starting
//! authsim --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use authsim::config::AppConfig;
use authsim::server::{init_tracing, ServerHandle};

/// Simulated user-authentication endpoint with Prometheus metrics.
#[derive(Parser, Debug)]
#[command(name = "authsim", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "AUTHSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Do not start the traffic generator.
    #[arg(long)]
    no_producer: bool,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(authsim::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.no_producer {
        config.producer.enabled = false;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Some(e) = load_error {
            return Err(e.into());
        }
        config.validate()?;
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!(
            "   Producer    : {} -> {} every {}ms",
            if config.producer.enabled { "on" } else { "off" },
            config.producer_target(config.server.port),
            config.producer.interval_ms
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(config).await?;
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}

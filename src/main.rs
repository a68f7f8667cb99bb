//! Vibration Monitor - WebSocket vibration analysis server
//!
//! # Usage
//!
//! ```bash
//! # Defaults: ws://0.0.0.0:8765, 100-entry history
//! cargo run --release
//!
//! # Custom listen address and history size
//! ./vibration-monitor --host 127.0.0.1 --port 9000 --capacity 500
//!
//! # Show the effective configuration
//! ./vibration-monitor --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `VIBRATION_CONFIG`: Path to a TOML config file (default: ./vibration.toml)
//! - `VIBRATION_HOST` / `VIBRATION_PORT` / `VIBRATION_CAPACITY`: CLI overrides
//! - `VIBRATION_CORS_ORIGINS`: Comma-separated origins for external dashboards
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use vibration_monitor::config::ServiceConfig;
use vibration_monitor::VibrationService;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vibration-monitor")]
#[command(about = "Real-time vibration analysis over WebSocket")]
#[command(version)]
struct CliArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long, env = "VIBRATION_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long, env = "VIBRATION_PORT")]
    port: Option<u16>,

    /// Number of results kept in history (overrides history.capacity)
    #[arg(long, env = "VIBRATION_CAPACITY")]
    capacity: Option<usize>,

    /// Explicit config file; skips the normal search order
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl CliArgs {
    fn resolve_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ServiceConfig::load(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(capacity) = self.capacity {
            config.history.capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let config = args.resolve_config()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Vibration Monitor");
    info!("  RMS / dominant-frequency analysis over WebSocket");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "History capacity: {} | Queues: {} in / {} out",
        config.history.capacity,
        config.connections.inbound_queue_depth,
        config.connections.outbound_queue_depth
    );

    let mut service = VibrationService::new(config)?;

    // Graceful shutdown via Ctrl+C
    let shutdown_token = service.cancel_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let addr = service.start().await?;
    info!("🌐 Dashboard API: http://{}/api/v1/status", addr);

    let supervised = service.supervise().await;
    if let Err(e) = &supervised {
        error!("Service failed: {}", e);
    }

    service.stop().await?;

    let history = service.history().stats();
    info!(
        "✓ Shutdown complete ({} results processed, {} retained)",
        history.total_appended, history.len
    );

    supervised
}

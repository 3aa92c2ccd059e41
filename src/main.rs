//! Oracle Gateway
//!
//! Admission control and input sanitization in front of the Oracle search
//! and chat APIs.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                  ORACLE GATEWAY                   │
//!                       │                                                   │
//!     Client Request    │  ┌─────────┐   ┌────────────┐   ┌─────────────┐  │
//!     ──────────────────┼─▶│  http   │──▶│ rate_limit │──▶│  sanitize   │  │
//!                       │  │ server  │   │ (per key)  │   │ + threats   │  │
//!                       │  └─────────┘   └─────┬──────┘   └──────┬──────┘  │
//!                       │                      │ 429              │         │
//!     Client Response   │                      ▼                  ▼         │
//!     ◀─────────────────┼──────────────── response.rs ◀──── api handlers   │
//!                       │                                                   │
//!                       │  ┌─────────────────────────────────────────────┐ │
//!                       │  │            Cross-Cutting Concerns            │ │
//!                       │  │  config · observability · lifecycle · admin  │ │
//!                       │  └─────────────────────────────────────────────┘ │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use oracle_gateway::http::HttpServer;
use oracle_gateway::lifecycle::{signals, startup, Shutdown};
use oracle_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "oracle-gateway")]
#[command(about = "Rate-limited, sanitizing gateway for the Oracle APIs", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ORACLE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::resolve_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!("oracle-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        admin_enabled = config.admin.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

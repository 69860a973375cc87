//! API gateway.
//!
//! Forwards each request to the backend whose `api.name` matches the first
//! path segment, looked up in the service registry on every request.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 API GATEWAY                  │
//!                        │                                              │
//!     Client Request     │  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!     ───────────────────┼─▶│  http  │──▶│ circuit │──▶│ dispatcher │   │
//!                        │  │ server │   │ breaker │   │            │   │
//!                        │  └────────┘   └─────────┘   └─────┬──────┘   │
//!                        │                                   │          │
//!                        │              ┌─────────┐    ┌─────▼──────┐   │
//!                        │              │ routing │◀───│  registry  │   │
//!                        │              │ matcher │    │  snapshot  │   │
//!                        │              └────┬────┘    └────────────┘   │
//!                        │                   ▼                          │
//!     Client Response    │             ┌───────────┐                    │
//!     ◀──────────────────┼─────────────│  client   │◀───────────────────┼──── fruits / names
//!                        │             │  handle   │                    │     services
//!                        │             └───────────┘                    │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_gateway::config::load_config;
use api_gateway::lifecycle::{self, signals, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Registry-driven API gateway with a circuit breaker", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await?;
    tracing::info!(address = %running.gateway_addr, "Gateway ready");

    tokio::spawn(signals::shutdown_on_ctrl_c(shutdown));
    running.wait().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

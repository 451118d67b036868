//! Legacy Reservation Gateway
//!
//! Fronts a third-party reservation API: keeps its bearer token fresh,
//! retries once on rejection, and normalizes its responses.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────────┐
//!                       │                    LEGACY GATEWAY                      │
//!                       │                                                        │
//!   Client Request      │  ┌─────────┐    ┌──────────┐    ┌──────────────┐      │
//!   ────────────────────┼─▶│  http   │───▶│  proxy   │───▶│   upstream   │──────┼──▶ Legacy API
//!                       │  │ server  │    │ gateway  │    │    client    │      │
//!                       │  └─────────┘    │ executor │    └──────────────┘      │
//!                       │                 └────┬─────┘                          │
//!                       │                      │                                │
//!                       │                      ▼                                │
//!                       │                 ┌──────────┐                          │
//!                       │                 │  token   │◀── admin (refresh)       │
//!                       │                 │  store   │                          │
//!                       │                 └──────────┘                          │
//!                       │                                                        │
//!                       │  config · observability · lifecycle · net (TLS)       │
//!                       └───────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use legacy_gateway::config::{load_config, TlsConfig};
use legacy_gateway::lifecycle::{shutdown_signal, Shutdown};
use legacy_gateway::net::tls::load_tls_config;
use legacy_gateway::observability::{logging, metrics};
use legacy_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "legacy-gateway")]
#[command(about = "Authentication and retry proxy for the legacy reservation API", long_about = None)]
struct Args {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // .env is optional
    let dotenv = dotenvy::dotenv();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "legacy-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        legacy_base_url = %config.legacy.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        token_cache = ?config.legacy.token_cache_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let admin_listener = if config.admin.enabled {
        Some(TcpListener::bind(&config.admin.bind_address).await?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let mut server_task = tokio::spawn(serve(server, tls, bind_address, admin_listener, receiver));

    tokio::select! {
        result = &mut server_task => {
            result??;
            tracing::info!("Server exited");
            return Ok(());
        }
        _ = shutdown_signal() => shutdown.trigger(),
    }

    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn serve(
    server: HttpServer,
    tls: Option<TlsConfig>,
    bind_address: String,
    admin_listener: Option<TcpListener>,
    shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            let addr: SocketAddr = bind_address
                .parse()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            server.run_tls(addr, rustls, admin_listener, shutdown).await
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, admin_listener, shutdown).await
        }
    }
}

//! HTTP server entry point.
//!
//! Parses flags into an explicit configuration struct, initializes tracing,
//! builds the router with its middleware pipeline, and serves until an
//! interrupt triggers graceful shutdown.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okserver::config::{Args, ServerConfig, DEFAULT_LOG_FILTER};
use okserver::{http, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Log filter priority: CLI > env > default
    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_args(&args);
    tracing::info!(
        listen = %config.listen_addr,
        tls = config.tls_enabled(),
        read_timeout = ?config.read_timeout,
        write_timeout = ?config.write_timeout,
        idle_timeout = ?config.idle_timeout,
        "server is starting"
    );

    let app = routes::create_router(&config);
    http::start_server(app, &config).await?;

    tracing::info!("server stopped");
    Ok(())
}

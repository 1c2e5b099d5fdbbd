//! Canned TCP responder entry point.
//!
//! Binds port 80 on all interfaces and answers every connection with a
//! fixed HTTP 200 response. Stops on interrupt; any accept error is fatal.

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okserver::config::{DEFAULT_LOG_FILTER, RESPONDER_LISTEN_ADDR};
use okserver::responder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("server is starting");

    let listener = TcpListener::bind(RESPONDER_LISTEN_ADDR).await?;
    tracing::info!(address = %listener.local_addr()?, "server is ready to handle connections");

    responder::serve(listener, shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}

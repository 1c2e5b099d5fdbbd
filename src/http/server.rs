//! HTTP server startup logic.
//!
//! Supports two modes, selected by configuration:
//! - Mutual TLS: all three certificate paths supplied
//! - Plaintext: anything less
//!
//! Lifecycle: starting (caller logs it) -> serving (logged once the
//! listener reports its address) -> shutting down (driven by the shutdown
//! task) -> stopped. A serve error outside an intentional shutdown is fatal
//! and propagates to the caller.

use std::net::SocketAddr;

use axum::Router;
use axum_server::accept::DefaultAcceptor;
use axum_server::tls_rustls::RustlsAcceptor;
use axum_server::Handle;

use crate::config::ServerConfig;

use super::conn::ConnLogAcceptor;
use super::shutdown;
use super::tls::{self, TlsError};

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid listen address '{addr}': {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to load TLS configuration: {0}")]
    Tls(#[from] TlsError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the HTTP server and block until it shuts down.
///
/// TLS failures surface here, before any connection is accepted.
pub async fn start_server(app: Router, config: &ServerConfig) -> Result<(), ServerError> {
    let addr: SocketAddr = config.listen_addr.parse().map_err(|source| ServerError::Addr {
        addr: config.listen_addr.clone(),
        source,
    })?;

    let handle = Handle::new();
    shutdown::spawn_shutdown_handler(handle.clone(), config.shutdown_grace);
    spawn_ready_logger(handle.clone());

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    match &config.tls {
        Some(paths) => {
            let rustls_config = tls::build_tls_config(paths)?;
            tracing::info!(
                ca = %paths.ca_cert.display(),
                cert = %paths.server_cert.display(),
                key = %paths.server_key.display(),
                "mutual TLS enabled"
            );

            let acceptor = ConnLogAcceptor::new(RustlsAcceptor::new(rustls_config));
            axum_server::bind(addr)
                .handle(handle)
                .acceptor(acceptor)
                .serve(make_service)
                .await?;
        }
        None => {
            tracing::warn!("TLS disabled - server running on plain HTTP");

            let acceptor = ConnLogAcceptor::new(DefaultAcceptor::new());
            axum_server::bind(addr)
                .handle(handle)
                .acceptor(acceptor)
                .serve(make_service)
                .await?;
        }
    }

    Ok(())
}

/// Log readiness once the listener is bound.
fn spawn_ready_logger(handle: Handle) {
    tokio::spawn(async move {
        if let Some(addr) = handle.listening().await {
            tracing::info!(address = %addr, "server is ready to handle requests");
        }
    });
}

//! Configuration and constants.
//!
//! All runtime configuration comes from command-line flags, parsed once at
//! startup into [`ServerConfig`] and passed by reference to setup functions.
//! Timeouts are fixed constants; the only variable surface is the listen
//! address and the TLS material paths.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default listen address for the HTTP server
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:1984";

/// Listen address for the TCP responder
pub const RESPONDER_LISTEN_ADDR: &str = "0.0.0.0:80";

/// Maximum time spent reading a request before it is abandoned
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time a handler may take to produce a response
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keep-alive window for idle connections
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// How long graceful shutdown waits for in-flight requests to drain
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "okserver=debug,tower_http=debug";

/// Command-line arguments for the HTTP server.
#[derive(Parser, Debug)]
#[command(name = "webserver", version, about)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// CA certificate path (client certificates are verified against it)
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Server certificate path
    #[arg(long)]
    pub server_cert: Option<PathBuf>,

    /// Server key path
    #[arg(long)]
    pub server_key: Option<PathBuf>,

    /// Log level filter (e.g., "okserver=debug,tower_http=info")
    #[arg(short = 'L', long)]
    pub log_level: Option<String>,
}

/// Immutable server configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub listen_addr: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
    /// Deadline for draining in-flight requests on shutdown
    pub shutdown_grace: Duration,
    /// TLS material; `None` runs the server in plaintext
    pub tls: Option<TlsPaths>,
}

/// Paths to the three PEM files required for mutual TLS.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub ca_cert: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
}

impl ServerConfig {
    /// Build the configuration from parsed arguments.
    ///
    /// Mutual TLS is enabled only when all three certificate flags are
    /// present; any smaller subset falls back to plaintext without error.
    pub fn from_args(args: &Args) -> Self {
        let tls = match (&args.ca_cert, &args.server_cert, &args.server_key) {
            (Some(ca_cert), Some(server_cert), Some(server_key)) => Some(TlsPaths {
                ca_cert: ca_cert.clone(),
                server_cert: server_cert.clone(),
                server_key: server_key.clone(),
            }),
            _ => None,
        };

        Self {
            listen_addr: args.listen.clone(),
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            idle_timeout: IDLE_TIMEOUT,
            shutdown_grace: SHUTDOWN_GRACE,
            tls,
        }
    }

    /// Whether the server will terminate TLS itself.
    pub fn tls_enabled(&self) -> bool {
        self.tls.is_some()
    }
}

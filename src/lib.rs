//! okserver - minimal demonstration servers.
//!
//! Two self-contained binaries built on this library:
//! - `tcpresponder`: a protocol-naive TCP listener answering every
//!   connection with a canned HTTP 200 response
//! - `webserver`: an Axum HTTP server with request-ID tracing, access
//!   logging, optional mutual TLS, and bounded graceful shutdown

pub mod config;
pub mod http;
pub mod middleware;
pub mod responder;
pub mod routes;

pub use config::ServerConfig;
pub use crate::http::{start_server, ServerError};

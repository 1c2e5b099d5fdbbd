//! HTTP server module with mutual-TLS support.
//!
//! The server runs in one of two modes:
//! - **Mutual TLS**: when a CA bundle, server certificate, and server key
//!   are all configured, clients must present a certificate signed by the CA
//! - **Plaintext**: anything less than the full triple
//!
//! The server includes:
//! - Connection-state logging (new / active / idle / closed)
//! - Graceful shutdown on interrupt, bounded by a drain deadline
//! - Forced exit on a second interrupt

pub mod conn;
pub mod server;
pub mod shutdown;
pub mod tls;

pub use server::{start_server, ServerError};

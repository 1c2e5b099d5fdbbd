//! HTTP route handlers.
//!
//! The server exposes a single handler at `/`, plus a fallback routing every
//! other path to the same handler, so any request answers 200 regardless of
//! path or method. A timeout layer bounds handler execution with the
//! configured write timeout.

pub mod index;

use axum::{routing::any, Router};
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::middleware;

/// Creates the Axum router with the middleware pipeline applied.
pub fn create_router(config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/", any(index::index))
        .fallback(index::index)
        .layer(TimeoutLayer::new(config.write_timeout));

    middleware::apply(router)
}

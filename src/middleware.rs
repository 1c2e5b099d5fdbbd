//! Request tracing and access logging middleware.
//!
//! The pipeline is composed at startup by [`apply`] as an explicit, ordered
//! stack of handler-wrapping layers: tracing (outermost), then access
//! logging, then the handler. The tracing layer assigns every request an ID
//! and opens a span carrying it, so all logs emitted while the request is
//! processed can be correlated.

use std::net::SocketAddr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tracing::Instrument;

/// Header used to propagate the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Typed per-request identifier, stored in request extensions by
/// [`request_id_layer`] and read back by [`access_log_layer`].
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Wrap a router in the middleware pipeline.
///
/// Layers apply bottom-up, so the last layer added here is the outermost:
/// tracing wraps logging wraps the routed handler.
pub fn apply(router: Router) -> Router {
    router
        .layer(middleware::from_fn(access_log_layer))
        .layer(middleware::from_fn(request_id_layer))
}

/// Generate a request ID from the current nanosecond timestamp.
fn next_request_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .to_string()
}

/// Tracing middleware: ensure every request carries an ID.
///
/// The inbound `X-Request-Id` header is honored if present and non-empty;
/// otherwise a fresh ID is generated. The ID is stored as a typed extension,
/// attached to a tracing span for the rest of the pipeline, and echoed back
/// in the response header.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(next_request_id);

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// Access-log middleware: one line per completed request.
///
/// Runs inside the tracing layer, so the request ID extension is already
/// populated; `"unknown"` is logged if it is ever absent.
pub async fn access_log_layer(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let protocol = request.version();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    let headers = request.headers().clone();

    let start = Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        protocol = ?protocol,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        user_agent = %user_agent,
        headers = ?headers,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

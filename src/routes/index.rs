//! The only real route: a liveness answer.

/// Answers every request with a plain-text `OK`.
pub async fn index() -> &'static str {
    "OK\n"
}

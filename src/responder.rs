//! Canned TCP responder.
//!
//! A deliberately protocol-naive liveness responder: every accepted
//! connection receives the same fixed HTTP response bytes and is closed
//! immediately, without reading anything the peer sent. Useful as a
//! capability probe behind port 80, not as a real HTTP implementation.

use std::future::Future;
use std::io;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// The fixed response written to every connection.
pub const RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nOK\n";

/// Run the accept loop until the shutdown future resolves.
///
/// Each accepted connection is served inline: the canned response is
/// written and the stream dropped, closing it. Accept errors are fatal and
/// propagate to the caller; write errors are logged and otherwise ignored,
/// since the peer may have already gone away.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("server is shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (mut stream, peer) = accepted?;
                tracing::info!(peer = %peer, "accepted connection");

                if let Err(error) = stream.write_all(RESPONSE).await {
                    tracing::debug!(peer = %peer, error = %error, "failed to write response");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_is_a_complete_http_message() {
        let text = std::str::from_utf8(RESPONSE).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("\r\nContent-Length: 3\r\n"));
        assert!(text.ends_with("\r\n\r\nOK\n"));
    }
}

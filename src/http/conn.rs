//! Connection-state logging.
//!
//! Wraps an [`Accept`] implementation so every connection logs its
//! lifecycle transitions: `new` when accepted, `active` on the first bytes
//! read, `idle` when a read parks after activity (a kept-alive connection
//! waiting for its next request), and `closed` when the stream is dropped.
//! Nothing is stored beyond the log lines themselves.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum_server::accept::Accept;
use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

/// Observed connection states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    New,
    Active,
    Idle,
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnState::New => write!(f, "new"),
            ConnState::Active => write!(f, "active"),
            ConnState::Idle => write!(f, "idle"),
        }
    }
}

/// Acceptor wrapper that adds connection-state logging to an inner
/// acceptor (plaintext passthrough or a TLS handshake).
#[derive(Debug, Clone)]
pub struct ConnLogAcceptor<A> {
    inner: A,
}

impl<A> ConnLogAcceptor<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A, S> Accept<TcpStream, S> for ConnLogAcceptor<A>
where
    A: Accept<TcpStream, S>,
    A::Future: Send + 'static,
    A::Stream: Send + 'static,
    A::Service: Send + 'static,
{
    type Stream = ConnLogStream<A::Stream>;
    type Service = A::Service;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: TcpStream, service: S) -> Self::Future {
        let peer = stream.peer_addr().ok();
        log_transition(peer, ConnState::New);

        let inner = self.inner.accept(stream, service);
        Box::pin(async move {
            let (stream, service) = inner.await?;
            Ok((ConnLogStream::new(stream, peer), service))
        })
    }
}

fn log_transition(peer: Option<SocketAddr>, state: ConnState) {
    match peer {
        Some(peer) => tracing::debug!(peer = %peer, state = %state, "connection state"),
        None => tracing::debug!(peer = "unknown", state = %state, "connection state"),
    }
}

/// Stream wrapper that observes reads to infer `active`/`idle` transitions
/// and logs `closed` on drop.
#[derive(Debug)]
pub struct ConnLogStream<S> {
    inner: S,
    peer: Option<SocketAddr>,
    state: ConnState,
}

impl<S> ConnLogStream<S> {
    fn new(inner: S, peer: Option<SocketAddr>) -> Self {
        Self {
            inner,
            peer,
            state: ConnState::New,
        }
    }

    fn transition(&mut self, state: ConnState) {
        if self.state != state {
            self.state = state;
            log_transition(self.peer, state);
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ConnLogStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        match &poll {
            Poll::Ready(Ok(())) if buf.filled().len() > before => {
                self.transition(ConnState::Active);
            }
            // A parked read on a previously active connection is a
            // kept-alive connection waiting for its next request.
            Poll::Pending if self.state == ConnState::Active => {
                self.transition(ConnState::Idle);
            }
            _ => {}
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ConnLogStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

impl<S> Drop for ConnLogStream<S> {
    fn drop(&mut self) {
        match self.peer {
            Some(peer) => tracing::debug!(peer = %peer, state = "closed", "connection state"),
            None => tracing::debug!(peer = "unknown", state = "closed", "connection state"),
        }
    }
}

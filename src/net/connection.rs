//! Per-connection HTTP state machine.
//!
//! # Responsibilities
//! - Drive one accepted stream through `Idle → Reading → Processing →
//!   Writing → (Reading | Closed)`
//! - Enforce the idle read deadline; a deadline expiry closes the
//!   connection exactly like a transport error
//! - Reject non-read methods before the router is consulted
//! - Deregister from the owning server on teardown
//!
//! Each I/O completion is a state transition, and every transition is logged
//! with the connection id. The connection suspends only while waiting for
//! bytes to arrive or flush; a stalled peer never holds a worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};

use crate::http::request::{self, Method, ParseError, Request};
use crate::http::response::Response;
use crate::http::router::RequestRouter;
use crate::net::server::Server;

/// Process-wide counter backing [`ConnectionId`]. Relaxed ordering is
/// enough; ids only need to be unique, never reused.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Monotonically increasing identifier assigned at accept time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle states of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Reading,
    Processing,
    Writing,
    Closed,
}

impl ConnectionState {
    fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Reading => "reading",
            ConnectionState::Processing => "processing",
            ConnectionState::Writing => "writing",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Why a read cycle ended without producing a request.
enum ReadEnd {
    PeerClosed,
    TimedOut,
    Shutdown,
    Failed(std::io::Error),
    Malformed(ParseError),
}

/// One accepted transport stream and its in-flight buffers.
///
/// The server owns the registry entry; the connection holds only a
/// non-owning back-reference used to request deregistration.
pub struct Connection {
    id: ConnectionId,
    stream: TcpStream,
    buffer: Vec<u8>,
    state: ConnectionState,
    router: Arc<RequestRouter>,
    server: Weak<Server>,
    read_timeout: Duration,
}

impl Connection {
    pub(crate) fn new(
        stream: TcpStream,
        router: Arc<RequestRouter>,
        server: Weak<Server>,
        read_timeout: Duration,
    ) -> Self {
        let id = ConnectionId::next();
        tracing::info!(connection_id = %id, "[CREATED] connection");
        Self {
            id,
            stream,
            buffer: Vec::new(),
            state: ConnectionState::Idle,
            router,
            server,
            read_timeout,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::debug!(
            connection_id = %self.id,
            from = self.state.as_str(),
            to = next.as_str(),
            "state transition"
        );
        self.state = next;
    }

    /// Run the request/response cycle until the connection closes.
    pub(crate) async fn run(mut self, mut close_signal: watch::Receiver<bool>) {
        loop {
            self.transition(ConnectionState::Reading);

            let request = match self.read_request(&mut close_signal).await {
                Ok(request) => request,
                Err(ReadEnd::PeerClosed) => {
                    tracing::info!(connection_id = %self.id, "[CLOSED] by remote endpoint");
                    break;
                }
                Err(ReadEnd::TimedOut) => {
                    tracing::info!(connection_id = %self.id, "[CLOSED] read deadline expired");
                    break;
                }
                Err(ReadEnd::Shutdown) => {
                    tracing::info!(connection_id = %self.id, "[CLOSED] server shutdown");
                    break;
                }
                Err(ReadEnd::Failed(error)) => {
                    tracing::error!(connection_id = %self.id, %error, "[ERROR] during read");
                    break;
                }
                Err(ReadEnd::Malformed(error)) => {
                    // Protocol failure: answer with a typed 400, then close.
                    tracing::warn!(connection_id = %self.id, %error, "[ERROR] malformed request");
                    self.transition(ConnectionState::Writing);
                    let response = Response::bad_request("bad request", false);
                    let _ = self.stream.write_all(&response.encode(false)).await;
                    break;
                }
            };

            self.transition(ConnectionState::Processing);
            tracing::info!(
                connection_id = %self.id,
                target = %request.target,
                method = request.method.as_str(),
                body = %request.body,
                "[REQUEST]"
            );

            // Non-read methods never reach the router.
            let response = if !request.method.is_read() {
                Response::bad_request("Unknown HTTP-method", false)
            } else {
                self.router.dispatch(&request)
            };
            let head_only = request.method == Method::Head;

            self.transition(ConnectionState::Writing);
            tracing::info!(
                connection_id = %self.id,
                status = response.status,
                body = %response.body,
                "[RESPONSE]"
            );

            if let Err(error) = self.stream.write_all(&response.encode(head_only)).await {
                tracing::error!(connection_id = %self.id, %error, "[FAILED] write");
                break;
            }

            if !response.keep_alive {
                break;
            }
        }

        self.close().await;
    }

    /// Accumulate bytes until a complete request is framed or the cycle
    /// ends. The deadline is absolute and covers the whole request read.
    async fn read_request(&mut self, close_signal: &mut watch::Receiver<bool>) -> Result<Request, ReadEnd> {
        let deadline = Instant::now() + self.read_timeout;
        let mut chunk = [0u8; 4096];

        loop {
            match request::try_parse(&self.buffer) {
                Ok(Some((request, consumed))) => {
                    self.buffer.drain(..consumed);
                    return Ok(request);
                }
                Ok(None) => {}
                Err(error) => return Err(ReadEnd::Malformed(error)),
            }

            tokio::select! {
                read = timeout_at(deadline, self.stream.read(&mut chunk)) => match read {
                    Err(_) => return Err(ReadEnd::TimedOut),
                    Ok(Ok(0)) => return Err(ReadEnd::PeerClosed),
                    Ok(Ok(count)) => self.buffer.extend_from_slice(&chunk[..count]),
                    Ok(Err(error)) => return Err(ReadEnd::Failed(error)),
                },
                _ = close_signal.changed() => return Err(ReadEnd::Shutdown),
            }
        }
    }

    /// Half-close the write side, then ask the server to drop this
    /// connection from its registry.
    async fn close(mut self) {
        self.transition(ConnectionState::Closed);
        tracing::info!(connection_id = %self.id, "[DISCONNECTED]");

        if let Err(error) = self.stream.shutdown().await {
            tracing::error!(connection_id = %self.id, %error, "[ERROR] during shutdown of session");
        }

        if let Some(server) = self.server.upgrade() {
            server.close(self.id);
        }

        tracing::info!(connection_id = %self.id, "[TERMINATED] connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_are_unique_and_monotonic() {
        let first = ConnectionId::next();
        let second = ConnectionId::next();
        assert_ne!(first, second);
        assert!(second.as_u64() > first.as_u64());
    }

    #[test]
    fn connection_id_display_is_tagged() {
        let id = ConnectionId::next();
        assert_eq!(format!("{id}"), format!("conn-{}", id.as_u64()));
    }
}

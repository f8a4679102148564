//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (staged socket setup)
//!     → server.rs (accept loop, connection registry)
//!     → connection.rs (per-connection state machine)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Idle → Reading → Processing → Writing → (Reading | Closed)
//! ```
//!
//! # Design Decisions
//! - The server owns connections through its registry; connections hold
//!   only a non-owning back-reference for deregistration
//! - Registry locks are never held across an await
//! - A read deadline expiry closes a connection like any transport error

pub mod connection;
pub mod listener;
pub mod server;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use listener::ListenerError;
pub use server::Server;

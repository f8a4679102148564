//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Connection read buffer
//!     → request.rs (incremental parse, keep-alive preference)
//!     → router.rs (path/body validation against the published snapshot)
//!     → response.rs (value type + wire encoding)
//!     → Connection write cycle
//! ```
//!
//! # Design Decisions
//! - HTTP/1.x only, Content-Length framing, no chunked transfer
//! - Method filtering (GET/HEAD) happens in the connection, before dispatch
//! - The router is infallible; internal faults become 500 responses

pub mod request;
pub mod response;
pub mod router;

pub use request::{try_parse, Method, ParseError, Request};
pub use response::Response;
pub use router::RequestRouter;

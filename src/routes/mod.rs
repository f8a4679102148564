//! Routing-table observation subsystem.
//!
//! # Data Flow
//! ```text
//! OS routing table
//!     → source.rs (snapshot acquisition, /proc/net/route)
//!     → manager.rs (tick cycle, retained baseline)
//!     → diff.rs (classify added / removed / changed)
//!     → bus (fan-out to observers)
//!     → published ArcSwap<RouteTable> (read-only HTTP side)
//! ```
//!
//! # Design Decisions
//! - Route identity is (destination, mask, interface index); gateway and
//!   metric are mutable attributes
//! - Removed-route matching ignores the interface index, mirroring the
//!   observed engine behavior (see diff.rs)
//! - The retained baseline is owned by the tick cycle alone; everyone else
//!   reads the atomically swapped published snapshot

pub mod diff;
pub mod manager;
pub mod source;
pub mod table;

pub use diff::{diff, RouteChange, TableDiff};
pub use manager::RouteManager;
pub use source::{ProcRouteSource, RouteSource, SourceError};
pub use table::{RouteEntry, RouteKey, RouteTable};

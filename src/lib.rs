//! routewatch
//!
//! A routing-table change monitor with an embedded HTTP/1.1 status server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   ROUTEWATCH                     │
//!                    │                                                  │
//!   OS routing table │  ┌─────────┐    ┌─────────┐    ┌──────────────┐  │
//!   ─────────────────┼─▶│ routes  │───▶│ routes  │───▶│     bus      │  │
//!                    │  │ source  │    │ manager │    │ (observers)  │  │
//!                    │  └─────────┘    └────┬────┘    └──────────────┘  │
//!                    │                      │ publishes                 │
//!                    │                      ▼                           │
//!                    │             ArcSwap<RouteTable>                  │
//!                    │                      ▲ reads                     │
//!   Client request   │  ┌─────────┐    ┌───┴─────┐    ┌──────────────┐  │
//!   ─────────────────┼─▶│   net   │───▶│  http   │───▶│     http     │  │
//!                    │  │ server  │    │ request │    │    router    │  │
//!   Client response  │  └─────────┘    └─────────┘    └──────┬───────┘  │
//!   ◀────────────────┼────────────────────────────────────────┘         │
//!                    │                                                  │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │          Cross-Cutting Concerns            │  │
//!                    │  │  ┌────────┐ ┌───────────┐ ┌─────────────┐  │  │
//!                    │  │  │ config │ │ lifecycle │ │observability│  │  │
//!                    │  │  └────────┘ └───────────┘ └─────────────┘  │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrency domains coexist: the poller tick cycle and the pool of
//! connection tasks. They share nothing but the atomically swapped latest
//! snapshot and the server's connection registry.

// Core subsystems
pub mod bus;
pub mod config;
pub mod http;
pub mod net;
pub mod routes;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use error::Error;

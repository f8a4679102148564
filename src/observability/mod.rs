//! Observability subsystem.
//!
//! All subsystems log through `tracing` with structured fields; connection
//! ids and route fields flow through every event. Log output is the only
//! observability surface this daemon carries.

pub mod logging;

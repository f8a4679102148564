//! Startup and shutdown coordination.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::handle_exit_signals;

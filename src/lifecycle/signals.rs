//! OS signal handling.

use tokio::signal::unix::{signal, SignalKind};

use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT or SIGTERM, then trigger the shutdown coordinator.
pub async fn handle_exit_signals(shutdown: &Shutdown) -> std::io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = interrupt.recv() => {
            tracing::info!(signal = "SIGINT", "received system exit signal");
        }
        _ = terminate.recv() => {
            tracing::info!(signal = "SIGTERM", "received system exit signal");
        }
    }

    shutdown.trigger();
    Ok(())
}

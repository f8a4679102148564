use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use routewatch::bus::RouteEventBus;
use routewatch::config::{self, WatchConfig};
use routewatch::http::RequestRouter;
use routewatch::lifecycle::{self, Shutdown};
use routewatch::net::Server;
use routewatch::observability::logging;
use routewatch::routes::{ProcRouteSource, RouteManager};
use routewatch::Error;

#[derive(Debug, Parser)]
#[command(name = "routewatch", version, about = "Routing-table change monitor")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(error) => {
                // Logging is not up yet; startup failures go to stderr.
                eprintln!("failed to load configuration: {error}");
                return Err(error.into());
            }
        },
        None => WatchConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "routewatch starting");

    let shutdown = Shutdown::new();

    // Poller side: source → manager → bus, snapshot published via ArcSwap.
    let bus = Arc::new(RouteEventBus::new());
    let manager = RouteManager::new(
        Arc::new(ProcRouteSource::new()),
        Arc::clone(&bus),
        Duration::from_millis(config.poller.interval_ms),
    );
    let published = manager.published();

    if config.poller.enabled {
        tokio::spawn(manager.run(shutdown.subscribe()));
    } else {
        tracing::info!("route poller disabled by configuration");
    }

    // HTTP side: reads the published snapshot only.
    let router = Arc::new(RequestRouter::new(published));
    let server = Server::new(router, Duration::from_secs(config.timeouts.read_secs));

    let listener = match server.open(&config.listener.bind_address) {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "cannot bind listening port, exiting");
            return Err(error.into());
        }
    };

    let server_task = tokio::spawn(Arc::clone(&server).run(listener, shutdown.subscribe()));

    lifecycle::handle_exit_signals(&shutdown).await?;

    let _ = server_task.await;
    tracing::info!("shutdown complete");
    Ok(())
}

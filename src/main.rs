//! Forwarding HTTP proxy binary.
//!
//! Loads configuration (TOML file when `CONFIG_PATH` points at one,
//! defaults plus environment overrides otherwise), initializes logging and
//! metrics, and runs the server until Ctrl+C.

use std::path::Path;
use tokio::net::TcpListener;

use forward_proxy::config::loader;
use forward_proxy::lifecycle::Shutdown;
use forward_proxy::observability::{logging, metrics};
use forward_proxy::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("CONFIG_PATH") {
        Ok(path) => loader::load_config(Path::new(&path))?,
        Err(_) => loader::load_from_env()?,
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_ttl_secs = config.cache.ttl_secs,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

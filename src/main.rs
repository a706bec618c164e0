//! PriceFeed service entrypoint

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use pricefeed::config::AppConfig;
use pricefeed::oracle::{CacheRefresher, CacheState, PriceQuery, RefreshScheduler};
use pricefeed::server::{self, ApiState};
use pricefeed::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    telemetry::init_tracing(&config.logging);
    telemetry::install_panic_hook();

    info!(config = %config, "Starting PriceFeed v{}", env!("CARGO_PKG_VERSION"));

    let state = Arc::new(CacheState::new());
    let refresher = Arc::new(CacheRefresher::from_config(&config, state)?);
    info!(sources = ?refresher.source_names(), "Price sources registered");

    let scheduler = RefreshScheduler::start(refresher.clone(), config.refresh_interval()).await;

    let api_state = Arc::new(ApiState::new(
        PriceQuery::new(refresher),
        config.server.service_name.clone(),
    ));

    let served = server::start_server(
        api_state,
        &config.server.host,
        config.server.port,
        shutdown_signal(),
    )
    .await;

    scheduler.shutdown().await;
    info!("PriceFeed stopped");

    served
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

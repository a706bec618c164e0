//! HTTP server
//!
//! Serves the price cache over JSON endpoints.
//! Only compiled when the `server` feature is enabled.

mod api;
mod types;

pub use api::create_router;
pub use types::*;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use crate::oracle::PriceQuery;

/// Shared state for request handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub query: PriceQuery,
    /// Name reported by `/health`
    pub service_name: String,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(query: PriceQuery, service_name: impl Into<String>) -> Self {
        Self {
            query,
            service_name: service_name.into(),
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn start_server<F>(
    state: Arc<ApiState>,
    host: &str,
    port: u16,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Price API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    Ok(())
}

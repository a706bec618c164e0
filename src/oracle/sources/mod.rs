//! Price source implementations (CoinGecko, DexScreener, fixed pegs)

mod coingecko;
mod dexscreener;
mod fixed;

pub use coingecko::{CoinGeckoSource, COINGECKO_BASE_URL, COINGECKO_IDS};
pub use dexscreener::{DexScreenerSource, DEXSCREENER_BASE_URL};
pub use fixed::{FixedPriceProvider, STABLECOINS};

use crate::types::Snapshot;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why an upstream fetch produced nothing
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("malformed payload: {0}")]
    Parse(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err)
        }
    }
}

/// Trait for network-bound price sources
///
/// Implementors only provide `try_fetch`; the refresher calls `fetch`,
/// which folds every failure into an empty contribution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch and normalize quotes, reporting failures explicitly
    async fn try_fetch(&self) -> Result<Snapshot, SourceError>;

    /// Fetch quotes, degrading any failure to an empty map
    async fn fetch(&self) -> Snapshot {
        match self.try_fetch().await {
            Ok(prices) => {
                tracing::debug!(source = %self.name(), tokens = prices.len(), "Fetched prices");
                prices
            }
            Err(e) => {
                tracing::warn!(source = %self.name(), error = %e, "Price fetch failed");
                Snapshot::new()
            }
        }
    }
}

/// Shared HTTP client for upstream calls with a bounded per-request timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pricefeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SourceError::Http)
}

/// Local upstream that accepts connections and never answers
#[cfg(test)]
pub(crate) async fn silent_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent upstream");
    let addr = listener.local_addr().expect("silent upstream address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

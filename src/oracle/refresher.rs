//! Cache refresher - rebuilds the snapshot from every source
//!
//! Seeds a fresh map with the fixed pegs, fans out to all network sources at
//! once, merges their results in registration order (later sources win on
//! collisions) and publishes the result as one swap.

use anyhow::{Context, Result};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::oracle::sources::{CoinGeckoSource, DexScreenerSource, FixedPriceProvider, PriceSource};
use crate::oracle::store::CacheState;
use crate::types::now_ms;

/// Result of a refresh call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another refresh held the in-progress flag; nothing was touched
    Skipped,
    /// A new snapshot was published
    Completed { tokens: usize, duration_ms: i64 },
    /// The cycle task itself died; the flag is released, nothing published
    Failed,
}

pub struct CacheRefresher {
    state: Arc<CacheState>,
    fixed: FixedPriceProvider,
    /// Merge order == registration order
    sources: Vec<Arc<dyn PriceSource>>,
}

impl CacheRefresher {
    pub fn new(state: Arc<CacheState>, fixed: FixedPriceProvider) -> Self {
        Self {
            state,
            fixed,
            sources: Vec::new(),
        }
    }

    /// Register a network source; it is merged after every source added before it
    pub fn with_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Fixed pegs, then CoinGecko, then DexScreener, as enabled in config.
    /// DexScreener is only registered once a pair address is set.
    pub fn from_config(config: &AppConfig, state: Arc<CacheState>) -> Result<Self> {
        let timeout = config.request_timeout();
        let fixed = FixedPriceProvider::with_symbols(&config.cache.stablecoins);
        let mut refresher = Self::new(state, fixed);

        if config.coingecko.enabled {
            let source = CoinGeckoSource::new(config.coingecko.base_url.clone(), timeout)
                .context("Failed to build CoinGecko client")?;
            refresher = refresher.with_source(Arc::new(source));
        }

        let dex = &config.dexscreener;
        if dex.enabled && dex.pair_address.is_empty() {
            info!(symbol = %dex.symbol, "DexScreener pair address not set, pair lookup disabled");
        } else if dex.enabled {
            let source = DexScreenerSource::new(
                dex.base_url.clone(),
                dex.chain.clone(),
                dex.pair_address.clone(),
                &dex.symbol,
                timeout,
            )
            .context("Failed to build DexScreener client")?;
            refresher = refresher.with_source(Arc::new(source));
        }

        Ok(refresher)
    }

    pub fn state(&self) -> &Arc<CacheState> {
        &self.state
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run one refresh cycle. Never fails; a cycle that overlaps a running
    /// one returns `Skipped` without touching the cache.
    ///
    /// The cycle runs on its own task: dropping the returned future stops
    /// the wait, not the refresh.
    pub async fn refresh(self: &Arc<Self>) -> RefreshOutcome {
        let refresher = Arc::clone(self);
        match tokio::spawn(async move { refresher.run_cycle().await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Refresh task failed");
                RefreshOutcome::Failed
            }
        }
    }

    async fn run_cycle(&self) -> RefreshOutcome {
        let Some(_guard) = self.state.try_begin_update() else {
            debug!("Refresh already in progress, skipping");
            return RefreshOutcome::Skipped;
        };

        let started_at = now_ms();
        debug!(sources = ?self.source_names(), "Refreshing price cache");

        let mut prices = self.fixed.provide();

        // One task per source so a panicking adapter only loses its own entries
        let tasks = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            tokio::spawn(async move { source.fetch().await })
        });
        let results = join_all(tasks).await;

        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(partial) => prices.extend(partial),
                Err(e) => {
                    error!(source = %source.name(), error = %e, "Price source task failed");
                }
            }
        }

        let completed_at = now_ms();
        let tokens = prices.len();
        self.state.publish(prices, completed_at).await;

        let duration_ms = completed_at - started_at;
        info!(tokens, duration_ms, "Price cache refreshed");

        RefreshOutcome::Completed {
            tokens,
            duration_ms,
        }
    }
}

impl std::fmt::Debug for CacheRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRefresher")
            .field("fixed", &self.fixed)
            .field("sources", &self.source_names())
            .finish()
    }
}

//! Read-side accessors over the cache plus the manual refresh trigger

use std::sync::Arc;
use thiserror::Error;

use crate::oracle::refresher::CacheRefresher;
use crate::oracle::store::CacheState;
use crate::types::{normalize_symbol, now_ms, PriceRecord, Snapshot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Token {symbol} not found")]
    NotFound {
        symbol: String,
        /// Sorted keys of the snapshot the lookup ran against
        available: Vec<String>,
    },
}

/// Full cache contents with freshness metadata
#[derive(Debug, Clone)]
pub struct CacheOverview {
    pub snapshot: Arc<Snapshot>,
    pub last_update: Option<i64>,
    /// `now - last_update` at call time
    pub cache_age: Option<i64>,
    pub token_count: usize,
    pub is_updating: bool,
}

/// One symbol's record with freshness metadata
#[derive(Debug, Clone, PartialEq)]
pub struct TokenQuote {
    pub symbol: String,
    pub record: PriceRecord,
    pub last_update: Option<i64>,
    pub cache_age: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PriceQuery {
    state: Arc<CacheState>,
    refresher: Arc<CacheRefresher>,
}

impl PriceQuery {
    pub fn new(refresher: Arc<CacheRefresher>) -> Self {
        Self {
            state: Arc::clone(refresher.state()),
            refresher,
        }
    }

    pub fn state(&self) -> &Arc<CacheState> {
        &self.state
    }

    pub async fn get_all(&self) -> CacheOverview {
        let view = self.state.view().await;
        CacheOverview {
            token_count: view.snapshot.len(),
            cache_age: cache_age(view.last_update, now_ms()),
            last_update: view.last_update,
            is_updating: self.state.is_updating(),
            snapshot: view.snapshot,
        }
    }

    /// Case-insensitive lookup of a single symbol
    pub async fn get_one(&self, symbol: &str) -> Result<TokenQuote, QueryError> {
        let symbol = normalize_symbol(symbol);
        let view = self.state.view().await;

        match view.snapshot.get(&symbol) {
            Some(record) => Ok(TokenQuote {
                record: record.clone(),
                last_update: view.last_update,
                cache_age: cache_age(view.last_update, now_ms()),
                symbol,
            }),
            None => {
                let mut available: Vec<String> = view.snapshot.keys().cloned().collect();
                available.sort();
                Err(QueryError::NotFound { symbol, available })
            }
        }
    }

    /// Refresh now and return whatever snapshot is current afterwards.
    /// If a cycle is already running this returns the previous snapshot.
    pub async fn force_refresh(&self) -> Arc<Snapshot> {
        self.refresher.refresh().await;
        self.state.snapshot().await
    }
}

fn cache_age(last_update: Option<i64>, now: i64) -> Option<i64> {
    last_update.map(|ts| now.saturating_sub(ts).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::sources::{FixedPriceProvider, PriceSource, SourceError, STABLECOINS};
    use crate::types::PriceSource as Source;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Slow;

    #[async_trait]
    impl PriceSource for Slow {
        fn name(&self) -> &'static str {
            "Slow"
        }

        async fn try_fetch(&self) -> Result<Snapshot, SourceError> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let mut prices = Snapshot::new();
            if let Some(record) = PriceRecord::new(50000.0, Some(1.0), Source::CoinGecko, now_ms()) {
                prices.insert("BTC".to_string(), record);
            }
            Ok(prices)
        }
    }

    fn query() -> PriceQuery {
        let state = Arc::new(CacheState::new());
        PriceQuery::new(Arc::new(CacheRefresher::new(state, FixedPriceProvider::new())))
    }

    #[test]
    fn cache_age_is_none_before_first_update() {
        assert_eq!(cache_age(None, 1_000), None);
        assert_eq!(cache_age(Some(400), 1_000), Some(600));
        assert_eq!(cache_age(Some(2_000), 1_000), Some(0));
    }

    #[tokio::test]
    async fn get_all_before_refresh_is_empty() {
        let overview = query().get_all().await;
        assert_eq!(overview.token_count, 0);
        assert!(overview.last_update.is_none());
        assert!(overview.cache_age.is_none());
        assert!(!overview.is_updating);
    }

    #[tokio::test]
    async fn get_one_is_case_insensitive() {
        let query = query();
        query.force_refresh().await;

        let lower = query.get_one("usdt").await.expect("usdt lookup");
        let upper = query.get_one("USDT").await.expect("USDT lookup");
        assert_eq!(lower.symbol, "USDT");
        assert_eq!(lower.record, upper.record);
    }

    #[tokio::test]
    async fn get_one_unknown_lists_exact_keys() {
        let query = query();
        query.force_refresh().await;

        match query.get_one("UNKNOWN").await {
            Err(QueryError::NotFound { symbol, available }) => {
                assert_eq!(symbol, "UNKNOWN");
                let mut expected: Vec<String> =
                    STABLECOINS.iter().map(|s| s.to_string()).collect();
                expected.sort();
                assert_eq!(available, expected);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cache_age_is_recomputed_per_call() {
        let query = query();
        query.force_refresh().await;

        let first = query.get_all().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = query.get_all().await;

        assert_eq!(first.last_update, second.last_update);
        assert!(second.cache_age.unwrap() >= first.cache_age.unwrap() + 15);
    }

    #[tokio::test]
    async fn force_refresh_returns_new_snapshot() {
        let query = query();
        let snapshot = query.force_refresh().await;
        assert_eq!(snapshot.len(), STABLECOINS.len());
        assert!(query.state().last_update().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_force_refresh_still_publishes() {
        let state = Arc::new(CacheState::new());
        let refresher = CacheRefresher::new(state.clone(), FixedPriceProvider::new())
            .with_source(Arc::new(Slow));
        let query = PriceQuery::new(Arc::new(refresher));

        let waited = tokio::time::timeout(Duration::from_millis(50), query.force_refresh()).await;
        assert!(waited.is_err());
        assert!(state.is_updating());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!state.is_updating());
        assert!(state.last_update().await.is_some());
        assert!(state.snapshot().await.contains_key("BTC"));
    }
}

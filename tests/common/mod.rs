//! Shared test doubles for the integration suites

#![allow(dead_code)]

use async_trait::async_trait;
use pricefeed::oracle::sources::{FixedPriceProvider, PriceSource, SourceError};
use pricefeed::oracle::{CacheRefresher, CacheState};
use pricefeed::types::{now_ms, PriceRecord, PriceSource as Source, Snapshot};
use std::sync::Arc;

/// Canned upstream: either a fixed set of records or an error
pub struct StubSource {
    pub name: &'static str,
    pub outcome: Result<Snapshot, u16>,
}

impl StubSource {
    pub fn ok(name: &'static str, prices: Snapshot) -> Arc<dyn PriceSource> {
        Arc::new(Self {
            name,
            outcome: Ok(prices),
        })
    }

    pub fn failing(name: &'static str) -> Arc<dyn PriceSource> {
        Arc::new(Self {
            name,
            outcome: Err(504),
        })
    }
}

#[async_trait]
impl PriceSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn try_fetch(&self) -> Result<Snapshot, SourceError> {
        match &self.outcome {
            Ok(prices) => Ok(prices.clone()),
            Err(code) => Err(SourceError::Status(*code)),
        }
    }
}

pub fn record(price: f64, change: f64, source: Source) -> PriceRecord {
    PriceRecord::new(price, Some(change), source, now_ms()).expect("valid test price")
}

/// `{BTC: 50000 / +2.5}` as CoinGecko would report it
pub fn coingecko_btc() -> Snapshot {
    let mut prices = Snapshot::new();
    prices.insert("BTC".to_string(), record(50000.0, 2.5, Source::CoinGecko));
    prices
}

/// `{ORBE: 0.0012 / -1.2}` as DexScreener would report it
pub fn dexscreener_orbe() -> Snapshot {
    let mut prices = Snapshot::new();
    prices.insert("ORBE".to_string(), record(0.0012, -1.2, Source::DexScreener));
    prices
}

pub fn refresher_with(
    sources: Vec<Arc<dyn PriceSource>>,
) -> (Arc<CacheState>, Arc<CacheRefresher>) {
    let state = Arc::new(CacheState::new());
    let refresher = sources.into_iter().fold(
        CacheRefresher::new(state.clone(), FixedPriceProvider::new()),
        |refresher, source| refresher.with_source(source),
    );
    (state, Arc::new(refresher))
}

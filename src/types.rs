//! Core types used throughout PriceFeed
//!
//! Defines the price record, its provenance tag and the snapshot map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Mapping from uppercase symbol to its current price record
pub type Snapshot = HashMap<String, PriceRecord>;

/// Provenance of a price record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Hardcoded 1:1 peg, no network lookup
    Fixed,
    CoinGecko,
    DexScreener,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Fixed => "fixed",
            PriceSource::CoinGecko => "coingecko",
            PriceSource::DexScreener => "dexscreener",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One asset's current price state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// USD price, always finite and > 0
    pub price: f64,
    /// Percent change over 24h
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub source: PriceSource,
    /// Epoch milliseconds when this record was computed
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl PriceRecord {
    /// Build a record, rejecting prices that are not finite and positive.
    ///
    /// A missing or non-finite 24h change is stored as `0.0`.
    pub fn new(
        price: f64,
        change_24h: Option<f64>,
        source: PriceSource,
        updated_at: i64,
    ) -> Option<Self> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        let change_24h = change_24h.filter(|c| c.is_finite()).unwrap_or(0.0);
        Some(Self {
            price,
            change_24h,
            source,
            updated_at,
        })
    }
}

/// Normalize a user-supplied symbol for lookup (`" btc "` -> `"BTC"`)
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Current time in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

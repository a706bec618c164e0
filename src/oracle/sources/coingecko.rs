//! CoinGecko simple-price client
//!
//! Batch quote lookup for the majors, keyed by a static symbol -> id table.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::oracle::sources::{http_client, PriceSource, SourceError};
use crate::types::{now_ms, PriceRecord, PriceSource as Source, Snapshot};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Symbols served from CoinGecko and their provider ids
pub const COINGECKO_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("BNB", "binancecoin"),
    ("SOL", "solana"),
];

#[derive(Debug, Clone, Deserialize)]
struct SimplePriceQuote {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn ids_param() -> String {
        COINGECKO_IDS
            .iter()
            .map(|(_, id)| *id)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Keep recognized ids that carry a valid positive USD price
    fn parse_response(body: &str, ts: i64) -> Result<Snapshot, SourceError> {
        let quotes: HashMap<String, SimplePriceQuote> =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

        let prices = COINGECKO_IDS
            .iter()
            .filter_map(|(symbol, id)| {
                let quote = quotes.get(*id)?;
                let record =
                    PriceRecord::new(quote.usd?, quote.usd_24h_change, Source::CoinGecko, ts)?;
                Some((symbol.to_string(), record))
            })
            .collect();

        Ok(prices)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &'static str {
        "CoinGecko"
    }

    async fn try_fetch(&self) -> Result<Snapshot, SourceError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = Self::ids_param();
        let params = [
            ("ids", ids.as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ];

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Self::parse_response(&body, now_ms())
    }
}

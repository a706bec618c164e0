//! DexScreener pair lookup
//!
//! Resolves a single on-chain trading pair to one symbol's USD price.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::oracle::sources::{http_client, PriceSource, SourceError};
use crate::types::{normalize_symbol, now_ms, PriceRecord, PriceSource as Source, Snapshot};

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

#[derive(Debug, Clone, Deserialize)]
struct PairsResponse {
    pair: Option<DexPair>,
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    price_usd: Option<String>,
    price_change: Option<PriceChange>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceChange {
    h24: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DexScreenerSource {
    client: reqwest::Client,
    base_url: String,
    chain: String,
    pair_address: String,
    symbol: String,
}

impl DexScreenerSource {
    pub fn new(
        base_url: impl Into<String>,
        chain: impl Into<String>,
        pair_address: impl Into<String>,
        symbol: &str,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain: chain.into(),
            pair_address: pair_address.into(),
            symbol: normalize_symbol(symbol),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn pair_url(&self) -> String {
        format!(
            "{}/latest/dex/pairs/{}/{}",
            self.base_url, self.chain, self.pair_address
        )
    }

    /// At most one record: the configured symbol, if the pair has a valid price
    fn parse_response(body: &str, symbol: &str, ts: i64) -> Result<Snapshot, SourceError> {
        let response: PairsResponse =
            serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

        let pair = response
            .pair
            .or_else(|| response.pairs.and_then(|pairs| pairs.into_iter().next()));

        let mut prices = Snapshot::new();
        let Some(pair) = pair else {
            tracing::debug!(source = %"DexScreener", "Pair lookup returned no pairs");
            return Ok(prices);
        };

        let price = pair
            .price_usd
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok());
        let change = pair.price_change.and_then(|c| c.h24);

        if let Some(record) =
            price.and_then(|p| PriceRecord::new(p, change, Source::DexScreener, ts))
        {
            prices.insert(symbol.to_string(), record);
        }

        Ok(prices)
    }
}

#[async_trait]
impl PriceSource for DexScreenerSource {
    fn name(&self) -> &'static str {
        "DexScreener"
    }

    async fn try_fetch(&self) -> Result<Snapshot, SourceError> {
        if self.pair_address.is_empty() {
            return Err(SourceError::NotConfigured("DexScreener pair address"));
        }

        let response = self.client.get(self.pair_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Self::parse_response(&body, &self.symbol, now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_single_pair_field() {
        let body = serde_json::json!({
            "schemaVersion": "1.0.0",
            "pair": { "priceUsd": "0.0012", "priceChange": { "h24": -1.2 } }
        })
        .to_string();

        let prices = DexScreenerSource::parse_response(&body, "ORBE", 5).unwrap();
        let orbe = prices.get("ORBE").expect("missing ORBE");
        assert_eq!(orbe.price, 0.0012);
        assert_eq!(orbe.change_24h, -1.2);
        assert_eq!(orbe.source, Source::DexScreener);
    }

    #[test]
    fn parse_falls_back_to_first_of_pairs() {
        let body = r#"{"pairs":[{"priceUsd":"0.5"},{"priceUsd":"9.9"}]}"#;
        let prices = DexScreenerSource::parse_response(body, "ORBE", 1).unwrap();
        assert_eq!(prices["ORBE"].price, 0.5);
        assert_eq!(prices["ORBE"].change_24h, 0.0);
    }

    #[test]
    fn parse_skips_unparseable_or_zero_price() {
        for body in [
            r#"{"pair":{"priceUsd":"n/a"}}"#,
            r#"{"pair":{"priceUsd":"0"}}"#,
            r#"{"pairs":null,"pair":null}"#,
            r#"{"pairs":[]}"#,
        ] {
            let prices = DexScreenerSource::parse_response(body, "ORBE", 1).unwrap();
            assert!(prices.is_empty(), "expected no entry for {body}");
        }
    }

    #[test]
    fn pair_url_joins_chain_and_address() {
        let source = DexScreenerSource::new(
            "https://api.dexscreener.com/",
            "bsc",
            "0xabc",
            "orbe",
            Duration::from_secs(1),
        )
        .expect("client should build");
        assert_eq!(
            source.pair_url(),
            "https://api.dexscreener.com/latest/dex/pairs/bsc/0xabc"
        );
        assert_eq!(source.symbol(), "ORBE");
    }

    #[tokio::test]
    async fn missing_pair_address_is_reported_not_fetched() {
        let source = DexScreenerSource::new(
            DEXSCREENER_BASE_URL,
            "bsc",
            "",
            "ORBE",
            Duration::from_secs(1),
        )
        .expect("client should build");
        let err = source.try_fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::NotConfigured(_)));
        assert!(source.fetch().await.is_empty());
    }
}

//! Fixed-price provider for assets pegged 1:1 to USD

use crate::types::{normalize_symbol, now_ms, PriceRecord, PriceSource as Source, Snapshot};

/// Stablecoins served at 1.0 USD without a network lookup
pub const STABLECOINS: &[&str] = &["USDT", "USDC", "DAI", "BUSD"];

const PEG_PRICE: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct FixedPriceProvider {
    symbols: Vec<String>,
}

impl FixedPriceProvider {
    pub fn new() -> Self {
        Self::with_symbols(STABLECOINS.iter().copied())
    }

    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = normalize_symbol(symbol.as_ref());
            if !symbol.is_empty() && !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self { symbols: unique }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Baseline entries for every pegged symbol, stamped now
    pub fn provide(&self) -> Snapshot {
        let ts = now_ms();
        self.symbols
            .iter()
            .map(|symbol| {
                let record = PriceRecord {
                    price: PEG_PRICE,
                    change_24h: 0.0,
                    source: Source::Fixed,
                    updated_at: ts,
                };
                (symbol.clone(), record)
            })
            .collect()
    }
}

impl Default for FixedPriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

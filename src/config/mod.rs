//! Configuration management for PriceFeed
//!
//! Loads defaults, optional `config/default` + `config/local` files and
//! environment variables (`.env` is read first via dotenvy).

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::oracle::sources::{COINGECKO_BASE_URL, DEXSCREENER_BASE_URL, STABLECOINS};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,
    pub coingecko: CoinGeckoConfig,
    pub dexscreener: DexScreenerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port (plain `PORT` env var overrides)
    pub port: u16,
    /// Name reported by `/health`
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Interval between scheduled refreshes in milliseconds
    pub refresh_interval_ms: u64,
    /// Symbols pegged 1:1 to USD
    pub stablecoins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Per-request timeout for upstream calls in milliseconds
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoConfig {
    pub enabled: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexScreenerConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Chain id used in the pair path (e.g. "bsc")
    pub chain: String,
    /// Pair contract address; empty disables the lookup
    pub pair_address: String,
    /// Symbol the pair price is published under
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let stablecoins: Vec<&str> = STABLECOINS.to_vec();

        let config = Config::builder()
            // Server defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.service_name", "pricefeed")?
            // Cache defaults
            .set_default("cache.refresh_interval_ms", DEFAULT_REFRESH_INTERVAL_MS as i64)?
            .set_default("cache.stablecoins", stablecoins)?
            // Upstream defaults
            .set_default("sources.request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS as i64)?
            .set_default("coingecko.enabled", true)?
            .set_default("coingecko.base_url", COINGECKO_BASE_URL)?
            .set_default("dexscreener.enabled", true)?
            .set_default("dexscreener.base_url", DEXSCREENER_BASE_URL)?
            .set_default("dexscreener.chain", "bsc")?
            .set_default("dexscreener.pair_address", "")?
            .set_default("dexscreener.symbol", "ORBE")?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (PRICEFEED__*)
            .add_source(Environment::with_prefix("PRICEFEED").separator("__"))
            // Plain PORT wins, as most hosting platforms inject it
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject values that would make the service misbehave silently
    pub fn validate(&self) -> Result<()> {
        if self.cache.refresh_interval_ms == 0 {
            bail!("cache.refresh_interval_ms must be greater than zero");
        }
        if self.sources.request_timeout_ms == 0 {
            bail!("sources.request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.cache.refresh_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.sources.request_timeout_ms)
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "port={} refresh_ms={} timeout_ms={} coingecko={} dexscreener={} stablecoins={:?}",
            self.server.port,
            self.cache.refresh_interval_ms,
            self.sources.request_timeout_ms,
            self.coingecko.enabled,
            self.dexscreener.enabled && !self.dexscreener.pair_address.is_empty(),
            self.cache.stablecoins
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
impl AppConfig {
    /// Local endpoints, DexScreener enabled without a pair
    pub(crate) fn sample() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_PORT,
                service_name: "pricefeed".to_string(),
            },
            cache: CacheConfig {
                refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
                stablecoins: vec!["USDT".to_string()],
            },
            sources: SourcesConfig {
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            },
            coingecko: CoinGeckoConfig {
                enabled: true,
                base_url: "http://localhost".to_string(),
            },
            dexscreener: DexScreenerConfig {
                enabled: true,
                base_url: "http://localhost".to_string(),
                chain: "bsc".to_string(),
                pair_address: String::new(),
                symbol: "ORBE".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig::sample()
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut cfg = sample();
        assert!(cfg.validate().is_ok());
        cfg.cache.refresh_interval_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn durations_follow_millisecond_fields() {
        let cfg = sample();
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(30));
        assert_eq!(cfg.request_timeout(), Duration::from_millis(4000));
    }

    #[test]
    fn digest_reports_disabled_dexscreener_without_pair() {
        let cfg = sample();
        assert!(cfg.digest().contains("dexscreener=false"));
    }
}

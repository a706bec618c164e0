//! PriceFeed Library
//!
//! Periodically refreshed token price cache served over HTTP

pub mod config;
pub mod oracle;
pub mod telemetry;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

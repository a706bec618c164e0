//! Oracle module - price cache
//!
//! Pulls quotes from CoinGecko and DexScreener on a timer, merges them with
//! the fixed stablecoin pegs and keeps the result as one shared snapshot.

mod query;
mod refresher;
mod scheduler;
mod store;
pub mod sources;

pub use query::{CacheOverview, PriceQuery, QueryError, TokenQuote};
pub use refresher::{CacheRefresher, RefreshOutcome};
pub use scheduler::RefreshScheduler;
pub use store::{CacheState, CacheView};

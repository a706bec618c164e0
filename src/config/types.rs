//! Configuration defaults

/// Port used when neither `PORT` nor `PRICEFEED__SERVER__PORT` is set
pub const DEFAULT_PORT: u16 = 3001;
/// Scheduled refresh period
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;
/// Upstream request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 4_000;

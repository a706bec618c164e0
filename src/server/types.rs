//! HTTP API Types
//!
//! Response bodies for the public price endpoints.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{PriceRecord, Snapshot};

// ─────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Process uptime in seconds
    pub uptime: f64,
    pub last_update: Option<i64>,
    pub tokens_available: usize,
    /// RFC 3339 response time
    pub timestamp: String,
}

// ─────────────────────────────────────────────────────────────────
// Prices
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PricesResponse {
    pub success: bool,
    pub data: Arc<Snapshot>,
    pub meta: PricesMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesMeta {
    pub last_update: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
    pub tokens_count: usize,
    pub is_updating: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub data: PriceRecord,
    pub meta: TokenMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMeta {
    pub last_update: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenNotFoundResponse {
    pub success: bool,
    pub error: String,
    pub available_tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub data: Arc<Snapshot>,
    /// RFC 3339 response time
    pub timestamp: String,
}

/// Generic failure body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

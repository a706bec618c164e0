//! HTTP API
//!
//! Read endpoints over the price cache plus the manual refresh trigger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::types::*;
use super::ApiState;
use crate::oracle::QueryError;

/// Create the API router with all endpoints
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/api/prices", get(get_prices))
        .route("/api/prices/refresh", post(refresh_prices))
        .route("/api/prices/:token", get(get_token_price))
        .fallback(not_found)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

/// GET /health - Liveness plus cache freshness
async fn get_health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let overview = state.query.get_all().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.service_name.clone(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        last_update: overview.last_update,
        tokens_available: overview.token_count,
        timestamp: rfc3339_now(),
    })
}

/// GET /api/prices - Full snapshot
async fn get_prices(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let overview = state.query.get_all().await;
    Json(PricesResponse {
        success: true,
        data: overview.snapshot,
        meta: PricesMeta {
            last_update: overview.last_update,
            cache_age: overview.cache_age,
            tokens_count: overview.token_count,
            is_updating: overview.is_updating,
        },
    })
}

/// GET /api/prices/:token - Single symbol, case-insensitive
async fn get_token_price(
    Path(token): Path<String>,
    State(state): State<Arc<ApiState>>,
) -> Response {
    match state.query.get_one(&token).await {
        Ok(quote) => Json(TokenResponse {
            success: true,
            token: quote.symbol,
            data: quote.record,
            meta: TokenMeta {
                last_update: quote.last_update,
                cache_age: quote.cache_age,
            },
        })
        .into_response(),
        Err(err) => {
            let error = err.to_string();
            let QueryError::NotFound { available, .. } = err;
            let body = TokenNotFoundResponse {
                success: false,
                error,
                available_tokens: available,
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

/// POST /api/prices/refresh - Refresh now, return the resulting snapshot
async fn refresh_prices(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.query.force_refresh().await;
    tracing::info!(tokens = snapshot.len(), "Manual price refresh requested");
    Json(RefreshResponse {
        success: true,
        message: "Prices refreshed".to_string(),
        data: snapshot,
        timestamp: rfc3339_now(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found")),
    )
}

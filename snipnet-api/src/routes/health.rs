//! Health Check Endpoint
//!
//! Provides a single /health endpoint reporting process liveness plus
//! cache-layer statistics. A failing cache degrades the status but never
//! makes it unhealthy: the request path survives without the cache.
//!
//! No authentication required.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Cache-layer statistics surfaced for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub entry_count: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /health - liveness plus cache statistics.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_seconds = state.start_time.elapsed().as_secs();

    match state.cache_backend.stats().await {
        Ok(stats) => Json(HealthResponse {
            status: HealthStatus::Healthy,
            uptime_seconds,
            cache: Some(CacheHealth {
                entry_count: stats.entry_count,
                hits: stats.hits,
                misses: stats.misses,
                hit_rate: stats.hit_rate(),
            }),
        }),
        Err(_) => Json(HealthResponse {
            status: HealthStatus::Degraded,
            uptime_seconds,
            cache: None,
        }),
    }
}

/// Build the health routes.
pub fn create_router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

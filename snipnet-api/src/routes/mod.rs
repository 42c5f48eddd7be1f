//! REST API Routes Module
//!
//! Includes:
//! - Vote routes (cast/remove/read, cached tally)
//! - WebSocket upgrade endpoint for live events
//! - Health check endpoint
//! - CORS support for browser-based clients

pub mod health;
pub mod votes;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::ws::ws_handler;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use votes::create_router as votes_router;

/// Build the complete API router with CORS and request tracing.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> ApiResult<Router> {
    let cors = build_cors_layer(config)?;

    let ws = Router::new()
        .route("/api/v1/ws", get(ws_handler))
        .with_state(state.clone());

    Ok(Router::new()
        .merge(votes::create_router(state.clone()))
        .merge(health::create_router(state))
        .merge(ws)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Build the CORS layer from configuration. An empty origin list allows
/// everything (dev mode).
fn build_cors_layer(config: &ApiConfig) -> ApiResult<CorsLayer> {
    if config.cors_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let mut origins = Vec::with_capacity(config.cors_origins.len());
    for origin in &config.cors_origins {
        let value = origin.parse::<HeaderValue>().map_err(|_| {
            ApiError::invalid_input(format!("Invalid CORS origin: {}", origin))
        })?;
        origins.push(value);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_valid_origins() {
        let config = ApiConfig {
            cors_origins: vec!["https://snipnet.app".to_string()],
            ..ApiConfig::default()
        };
        assert!(build_cors_layer(&config).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let config = ApiConfig {
            cors_origins: vec!["https://snipnet.app\n".to_string()],
            ..ApiConfig::default()
        };
        assert!(build_cors_layer(&config).is_err());
    }

    #[test]
    fn test_router_builds() {
        let state = AppState::new(&ApiConfig::default());
        assert!(create_api_router(state, &ApiConfig::default()).is_ok());
    }
}

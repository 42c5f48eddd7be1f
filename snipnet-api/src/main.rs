//! SNIPNET API Server Entry Point
//!
//! Bootstraps configuration, wires the engagement stack, and starts the
//! Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use snipnet_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let config = ApiConfig::from_env();
    let state = AppState::new(&config);
    let app: Router = create_api_router(state, &config)?;

    let addr = resolve_bind_addr(&config)?;
    tracing::info!(%addr, "Starting SNIPNET API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("snipnet=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    format!("{}:{}", config.bind_host, config.port)
        .parse()
        .map_err(|e| {
            ApiError::internal_error(format!(
                "Invalid bind address {}:{}: {}",
                config.bind_host, config.port, e
            ))
        })
}

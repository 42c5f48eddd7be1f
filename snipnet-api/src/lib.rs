//! SNIPNET API - HTTP and WebSocket surface of the engagement core.
//!
//! Routes translate requests into coordinator calls; everything stateful
//! lives in the crates below this one. Identity arrives pre-verified from
//! the upstream auth layer as an `X-User-Id` header.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use auth::UserIdentity;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;

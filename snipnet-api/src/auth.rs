//! Request Identity
//!
//! The engagement core sits behind the application's auth layer, which
//! verifies credentials and forwards the resolved user as an `X-User-Id`
//! header. This module extracts that identity; a missing header means the
//! upstream did not authenticate the request.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use snipnet_core::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated user id, set by the upstream layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdentity(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .ok_or_else(|| ApiError::invalid_format("X-User-Id", "an integer user id"))?;

        Ok(UserIdentity(user_id))
    }
}

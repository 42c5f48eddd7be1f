//! Vote REST API Routes
//!
//! Route handlers for casting, removing, and reading votes on items.
//! All mutations go through the engagement coordinator, which owns the
//! ledger-then-cache-then-broadcast pipeline; handlers here only translate
//! HTTP to coordinator calls.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use snipnet_core::{ItemId, VoteDirection, VoteState, VoteTally};
use snipnet_engagement::VoteOutcome;

use crate::auth::UserIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

/// Body for POST /api/v1/items/{id}/vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    /// Direction to cast. Casting the same direction twice removes the vote.
    pub direction: VoteDirection,
}

/// Response for vote mutations: the caller's resulting state plus the fresh
/// aggregate snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub item_id: ItemId,
    /// The caller's vote state after the mutation.
    pub state: VoteState,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
    /// Monotonic per-item version; clients use it to discard stale
    /// broadcasts.
    pub version: u64,
}

impl VoteResponse {
    fn new(item_id: ItemId, state: VoteState, tally: VoteTally) -> Self {
        Self {
            item_id,
            state,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.score(),
            version: tally.version,
        }
    }

    fn from_outcome(item_id: ItemId, outcome: VoteOutcome) -> Self {
        Self::new(item_id, outcome.state, outcome.tally)
    }
}

/// Response for GET /api/v1/items/{id}/vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteStateResponse {
    pub item_id: ItemId,
    pub state: VoteState,
}

/// Response for GET /api/v1/items/{id}/votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyResponse {
    pub item_id: ItemId,
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
    pub version: u64,
}

impl TallyResponse {
    fn new(item_id: ItemId, tally: VoteTally) -> Self {
        Self {
            item_id,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.score(),
            version: tally.version,
        }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/items/{id}/vote - cast (or toggle/switch) a vote.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    identity: UserIdentity,
    Json(req): Json<VoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .coordinator
        .vote(item_id, identity.0, req.direction)
        .await;
    Ok(Json(VoteResponse::from_outcome(item_id, outcome)))
}

/// DELETE /api/v1/items/{id}/vote - remove the caller's vote. Idempotent.
pub async fn remove_vote(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    identity: UserIdentity,
) -> ApiResult<impl IntoResponse> {
    let tally = state.coordinator.remove_vote(item_id, identity.0).await;
    Ok(Json(VoteResponse::new(item_id, VoteState::None, tally)))
}

/// GET /api/v1/items/{id}/vote - the caller's current vote state.
pub async fn vote_state(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    identity: UserIdentity,
) -> ApiResult<impl IntoResponse> {
    let vote_state = state.coordinator.vote_state(item_id, identity.0).await;
    Ok(Json(VoteStateResponse {
        item_id,
        state: vote_state,
    }))
}

/// GET /api/v1/items/{id}/votes - the item's tally, served through the
/// cache. Unlike the handlers above this needs no identity.
pub async fn item_tally(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> ApiResult<impl IntoResponse> {
    let tally = state.coordinator.tally(item_id).await;
    Ok(Json(TallyResponse::new(item_id, tally)))
}

/// Build the vote routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/items/:item_id/vote",
            get(vote_state).post(cast_vote).delete(remove_vote),
        )
        .route("/api/v1/items/:item_id/votes", get(item_tally))
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    fn test_app() -> (Router, AppState) {
        let state = AppState::new(&ApiConfig::default());
        (create_router(state.clone()), state)
    }

    fn vote_request(item_id: ItemId, user_id: i64, direction: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/items/{}/vote", item_id))
            .header("x-user-id", user_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"direction":"{}"}}"#, direction)))
            .expect("request builds")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn test_cast_vote_returns_state_and_tally() {
        let (app, _state) = test_app();

        let response = app
            .oneshot(vote_request(42, 1, "up"))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["item_id"], 42);
        assert_eq!(json["state"], "up");
        assert_eq!(json["upvotes"], 1);
        assert_eq!(json["downvotes"], 0);
        assert_eq!(json["score"], 1);
        assert_eq!(json["version"], 1);
    }

    #[tokio::test]
    async fn test_same_direction_twice_toggles_off() {
        let (app, _state) = test_app();

        app.clone()
            .oneshot(vote_request(42, 1, "up"))
            .await
            .expect("request succeeds");
        let response = app
            .oneshot(vote_request(42, 1, "up"))
            .await
            .expect("request succeeds");

        let json = body_json(response).await;
        assert_eq!(json["state"], "none");
        assert_eq!(json["upvotes"], 0);
        assert_eq!(json["version"], 2);
    }

    #[tokio::test]
    async fn test_vote_without_identity_is_unauthorized() {
        let (app, _state) = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/items/42/vote")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"direction":"up"}"#))
            .expect("request builds");

        let response = app.oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_direction_is_rejected() {
        let (app, _state) = test_app();

        let response = app
            .oneshot(vote_request(42, 1, "sideways"))
            .await
            .expect("request succeeds");
        // Serde rejects the enum value during body extraction.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_remove_vote_is_idempotent() {
        let (app, _state) = test_app();

        app.clone()
            .oneshot(vote_request(7, 1, "down"))
            .await
            .expect("request succeeds");

        let delete = |app: Router| async move {
            let request = Request::builder()
                .method("DELETE")
                .uri("/api/v1/items/7/vote")
                .header("x-user-id", "1")
                .body(Body::empty())
                .expect("request builds");
            app.oneshot(request).await.expect("request succeeds")
        };

        let response = delete(app.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["state"], "none");
        assert_eq!(json["downvotes"], 0);

        // Second delete: still 200, nothing changed.
        let response = delete(app).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["downvotes"], 0);
    }

    #[tokio::test]
    async fn test_vote_state_reflects_other_items_independently() {
        let (app, _state) = test_app();

        app.clone()
            .oneshot(vote_request(1, 5, "up"))
            .await
            .expect("request succeeds");

        let state_of = |app: Router, item: i64| async move {
            let request = Request::builder()
                .uri(format!("/api/v1/items/{}/vote", item))
                .header("x-user-id", "5")
                .body(Body::empty())
                .expect("request builds");
            body_json(app.oneshot(request).await.expect("request succeeds")).await
        };

        assert_eq!(state_of(app.clone(), 1).await["state"], "up");
        assert_eq!(state_of(app, 2).await["state"], "none");
    }

    #[tokio::test]
    async fn test_item_tally_requires_no_identity() {
        let (app, _state) = test_app();

        app.clone()
            .oneshot(vote_request(3, 1, "up"))
            .await
            .expect("request succeeds");
        app.clone()
            .oneshot(vote_request(3, 2, "down"))
            .await
            .expect("request succeeds");

        let request = Request::builder()
            .uri("/api/v1/items/3/votes")
            .body(Body::empty())
            .expect("request builds");
        let response = app.oneshot(request).await.expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["upvotes"], 1);
        assert_eq!(json["downvotes"], 1);
        assert_eq!(json["score"], 0);
    }

    #[tokio::test]
    async fn test_vote_grants_badge_to_qualifying_user() {
        use snipnet_storage::GrantStore;
        use snipnet_test_utils::{
            seed_aggregates, AggregateBuilder, InMemoryAggregateStore, InMemoryCacheBackend,
            InMemoryGrantStore,
        };
        use std::sync::Arc;
        use std::time::Duration;

        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        seed_aggregates(
            &aggregates,
            [AggregateBuilder::new(1).reputation(100).build()],
        )
        .await;

        let state = AppState::with_stores(
            &ApiConfig::default(),
            Arc::new(InMemoryCacheBackend::new()),
            aggregates,
            grants.clone(),
        );
        let app = create_router(state);

        app.oneshot(vote_request(42, 1, "up"))
            .await
            .expect("request succeeds");

        // Badge evaluation runs on a detached task; poll until it lands.
        for _ in 0..50 {
            if !grants.granted(1).await.expect("granted").is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(grants
            .granted(1)
            .await
            .expect("granted")
            .contains("rising-star"));
    }

    #[tokio::test]
    async fn test_vote_reaches_topic_subscriber() {
        let (app, state) = test_app();

        let (connection_id, mut rx) = state.hub.register(99);
        rx.recv().await.expect("connected event");
        state
            .hub
            .subscribe(connection_id, snipnet_engagement::Topic::item(42));

        app.oneshot(vote_request(42, 1, "up"))
            .await
            .expect("request succeeds");

        let event = rx.recv().await.expect("vote update");
        assert_eq!(event.event_type(), "vote_update");
    }
}

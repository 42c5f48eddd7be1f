//! SNIPNET Test Utilities
//!
//! Centralized test infrastructure for the SNIPNET workspace:
//! - Builders for user aggregates and seeded in-memory stores
//! - Proptest generators for vote directions and aggregates
//! - Convenience re-exports of the core types tests touch most

// Re-export in-memory stores from their source crate
pub use snipnet_storage::{InMemoryAggregateStore, InMemoryCacheBackend, InMemoryGrantStore};

// Re-export core types for convenience
pub use snipnet_core::{
    ItemId, UserAggregate, UserId, VoteDirection, VoteState, VoteTally, BADGE_RULES,
};

use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// FIXTURES
// ============================================================================

/// Builder for [`UserAggregate`] fixtures.
///
/// Defaults to a brand-new user (zero reputation, nothing authored); each
/// setter moves the user past one badge threshold at a time.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    aggregate: UserAggregate,
}

impl AggregateBuilder {
    /// Start from a zeroed aggregate for the given user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            aggregate: UserAggregate {
                user_id,
                ..Default::default()
            },
        }
    }

    pub fn reputation(mut self, reputation: i64) -> Self {
        self.aggregate.reputation = reputation;
        self
    }

    pub fn snippets(mut self, count: u64) -> Self {
        self.aggregate.snippet_count = count;
        self
    }

    pub fn comments(mut self, count: u64) -> Self {
        self.aggregate.comment_count = count;
        self
    }

    pub fn build(self) -> UserAggregate {
        self.aggregate
    }
}

/// Seed an aggregate store with the given users.
pub async fn seed_aggregates(
    store: &Arc<InMemoryAggregateStore>,
    aggregates: impl IntoIterator<Item = UserAggregate>,
) {
    for aggregate in aggregates {
        store.upsert(aggregate).await;
    }
}

/// A placeholder cache value for tests that only care whether a key
/// survives invalidation.
pub fn stale_marker() -> serde_json::Value {
    serde_json::json!("stale")
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Strategy producing either vote direction.
pub fn vote_direction() -> impl Strategy<Value = VoteDirection> {
    prop_oneof![Just(VoteDirection::Up), Just(VoteDirection::Down)]
}

/// Strategy producing arbitrary user aggregates with counts in ranges that
/// straddle every badge threshold.
pub fn user_aggregate(user_id: UserId) -> impl Strategy<Value = UserAggregate> {
    (0i64..2000, 0u64..5, 0u64..5).prop_map(move |(reputation, snippets, comments)| {
        UserAggregate {
            user_id,
            reputation,
            snippet_count: snippets,
            comment_count: comments,
        }
    })
}

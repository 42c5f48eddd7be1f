//! System-of-record seams.
//!
//! The relational store owns users, items, and grants; the engagement core
//! observes aggregates read-only and appends achievement grants. These
//! traits are the only contact surface, so tests and the in-process binary
//! run against the in-memory implementations below while production plugs
//! in the real database.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use snipnet_core::{EngagementResult, UserAggregate, UserId};
use tokio::sync::RwLock;

/// Read-only access to a user's aggregate counters.
#[async_trait]
pub trait AggregateSource: Send + Sync {
    /// Load the current counters for a user. `None` means the user does not
    /// exist (deleted account, or a race with account creation).
    async fn load(&self, user_id: UserId) -> EngagementResult<Option<UserAggregate>>;
}

/// Append-only store of achievement grants.
///
/// The `(user_id, badge_id)` pair is unique. `insert` is idempotent under
/// races: a duplicate insert returns `Ok(false)` rather than an error, which
/// is what makes concurrent evaluations of the same user safe.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Insert a grant. Returns `true` if the grant was newly created,
    /// `false` if the user already held the badge.
    async fn insert(&self, user_id: UserId, badge_id: &str) -> EngagementResult<bool>;

    /// The set of badge ids already granted to a user.
    async fn granted(&self, user_id: UserId) -> EngagementResult<HashSet<String>>;
}

// ============================================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================================

/// In-memory aggregate store with write access for tests and the
/// single-process binary.
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    aggregates: RwLock<HashMap<UserId, UserAggregate>>,
}

impl InMemoryAggregateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user's counters.
    pub async fn upsert(&self, aggregate: UserAggregate) {
        let mut aggregates = self.aggregates.write().await;
        aggregates.insert(aggregate.user_id, aggregate);
    }

    /// Apply a mutation to a user's counters, creating the row if absent.
    pub async fn update<F>(&self, user_id: UserId, mutate: F)
    where
        F: FnOnce(&mut UserAggregate),
    {
        let mut aggregates = self.aggregates.write().await;
        let aggregate = aggregates.entry(user_id).or_insert(UserAggregate {
            user_id,
            ..Default::default()
        });
        mutate(aggregate);
    }
}

#[async_trait]
impl AggregateSource for InMemoryAggregateStore {
    async fn load(&self, user_id: UserId) -> EngagementResult<Option<UserAggregate>> {
        let aggregates = self.aggregates.read().await;
        Ok(aggregates.get(&user_id).copied())
    }
}

/// In-memory grant store enforcing `(user_id, badge_id)` uniqueness.
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    grants: RwLock<HashSet<(UserId, String)>>,
}

impl InMemoryGrantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn insert(&self, user_id: UserId, badge_id: &str) -> EngagementResult<bool> {
        let mut grants = self.grants.write().await;
        Ok(grants.insert((user_id, badge_id.to_string())))
    }

    async fn granted(&self, user_id: UserId) -> EngagementResult<HashSet<String>> {
        let grants = self.grants.read().await;
        Ok(grants
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, badge)| badge.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_aggregate_store_load_and_update() {
        let store = InMemoryAggregateStore::new();
        assert_eq!(store.load(1).await.expect("load should succeed"), None);

        store
            .upsert(UserAggregate {
                user_id: 1,
                reputation: 50,
                snippet_count: 2,
                comment_count: 0,
            })
            .await;
        store.update(1, |agg| agg.reputation += 60).await;

        let agg = store
            .load(1)
            .await
            .expect("load should succeed")
            .expect("user exists");
        assert_eq!(agg.reputation, 110);
        assert_eq!(agg.snippet_count, 2);
    }

    #[tokio::test]
    async fn test_grant_insert_is_idempotent() {
        let store = InMemoryGrantStore::new();
        assert!(store
            .insert(1, "first-snippet")
            .await
            .expect("insert should succeed"));
        // Duplicate insert is a benign no-op, not an error.
        assert!(!store
            .insert(1, "first-snippet")
            .await
            .expect("insert should succeed"));

        let granted = store.granted(1).await.expect("granted should succeed");
        assert_eq!(granted.len(), 1);
        assert!(granted.contains("first-snippet"));
    }

    #[tokio::test]
    async fn test_grants_are_per_user() {
        let store = InMemoryGrantStore::new();
        store
            .insert(1, "rising-star")
            .await
            .expect("insert should succeed");

        let other = store.granted(2).await.expect("granted should succeed");
        assert!(other.is_empty());
    }
}

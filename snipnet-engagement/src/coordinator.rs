//! Engagement coordinator.
//!
//! Orchestrates one mutation end to end: ledger commit, cache
//! invalidation, topic publish, then detached badge evaluation. The
//! ordering contract is strict on the synchronous half (invalidation is
//! issued after the ledger commit and before the caller is acknowledged),
//! while the publish and the badge evaluation are best-effort and must
//! never delay or fail the response.

use std::sync::Arc;
use std::time::Duration;

use snipnet_core::{ItemId, UserId, VoteDirection, VoteState, VoteTally};
use snipnet_storage::{keys, FailOpenCache};
use tracing::debug;

use crate::badges::AchievementEngine;
use crate::events::{EngagementEvent, Topic};
use crate::hub::RealtimeHub;
use crate::ledger::{VoteLedger, VoteOutcome};

/// Tuning for the coordinator's cache writes.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// TTL for warmed tally snapshots. Bounds staleness for any entry that
    /// escapes invalidation (e.g. written concurrently with a pattern
    /// delete scan).
    pub tally_ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tally_ttl: Duration::from_secs(60),
        }
    }
}

/// Orchestrates vote mutations across ledger, cache, hub, and badges.
pub struct EngagementCoordinator {
    ledger: Arc<VoteLedger>,
    cache: FailOpenCache,
    hub: Arc<RealtimeHub>,
    badges: Arc<AchievementEngine>,
    config: CoordinatorConfig,
}

impl EngagementCoordinator {
    /// Assemble a coordinator from explicitly constructed parts. Nothing
    /// here is process-global; tests build fresh isolated instances.
    pub fn new(
        ledger: Arc<VoteLedger>,
        cache: FailOpenCache,
        hub: Arc<RealtimeHub>,
        badges: Arc<AchievementEngine>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            ledger,
            cache,
            hub,
            badges,
            config,
        }
    }

    /// Cast a vote and run the full pipeline.
    ///
    /// The returned outcome is the caller's synchronous answer; every other
    /// subscriber learns of the change through the published event, which
    /// may arrive before or after the caller's own response.
    pub async fn vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        direction: VoteDirection,
    ) -> VoteOutcome {
        let outcome = self.ledger.cast_vote(item_id, user_id, direction).await;
        self.invalidate_and_warm(item_id, outcome.tally).await;
        self.hub.publish(
            &Topic::item(item_id),
            EngagementEvent::vote_update(item_id, outcome.tally),
        );
        self.spawn_badge_evaluation(user_id);
        outcome
    }

    /// Remove a vote. Idempotent: removing a non-existent vote changes
    /// nothing, publishes nothing, and still returns the current tally.
    pub async fn remove_vote(&self, item_id: ItemId, user_id: UserId) -> VoteTally {
        let (tally, changed) = self.ledger.remove_vote(item_id, user_id).await;
        if changed {
            self.invalidate_and_warm(item_id, tally).await;
            self.hub.publish(
                &Topic::item(item_id),
                EngagementEvent::vote_update(item_id, tally),
            );
            self.spawn_badge_evaluation(user_id);
        }
        tally
    }

    /// The acting user's current vote state (read-only).
    pub async fn vote_state(&self, item_id: ItemId, user_id: UserId) -> VoteState {
        self.ledger.vote_state(item_id, user_id).await
    }

    /// Read an item's tally through the cache: hit serves the snapshot,
    /// miss reads the ledger and warms the cache.
    pub async fn tally(&self, item_id: ItemId) -> VoteTally {
        let key = keys::item_votes(item_id);
        if let Some(cached) = self.cache.get_as::<VoteTally>(&key).await {
            return cached;
        }
        let tally = self.ledger.tally(item_id).await;
        self.cache
            .set(&key, &tally, Some(self.config.tally_ttl))
            .await;
        tally
    }

    /// Hook for the CRUD layer: a snippet was created. Feed listings go
    /// stale and the author may have crossed a badge threshold.
    pub async fn snippet_created(&self, author_id: UserId) {
        self.cache.delete_by_pattern(&keys::feed_pattern()).await;
        self.spawn_badge_evaluation(author_id);
    }

    /// Invalidate every cache entry derived from an item, then warm the
    /// tally snapshot with the fresh value. Issued before the caller is
    /// acknowledged; all calls fail open.
    async fn invalidate_and_warm(&self, item_id: ItemId, tally: VoteTally) {
        self.cache.delete(&keys::item(item_id)).await;
        self.cache
            .delete_by_pattern(&keys::item_subkey_pattern(item_id))
            .await;
        // A vote changes item ordering in score-sorted listings.
        self.cache.delete_by_pattern(&keys::feed_pattern()).await;

        self.cache
            .set(
                &keys::item_votes(item_id),
                &tally,
                Some(self.config.tally_ttl),
            )
            .await;
        debug!(item_id, version = tally.version, "Cache invalidated and tally warmed");
    }

    /// Detach badge evaluation from the request. Errors are handled (and
    /// logged) inside `evaluate`; if the process dies first, the next
    /// qualifying action re-evaluates from current state.
    fn spawn_badge_evaluation(&self, user_id: UserId) {
        let badges = Arc::clone(&self.badges);
        tokio::spawn(async move {
            badges.evaluate(user_id).await;
        });
    }
}

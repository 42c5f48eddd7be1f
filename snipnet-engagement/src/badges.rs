//! Threshold-triggered achievement engine.
//!
//! Evaluation is always a side effect of some other action (a vote, a
//! snippet creation) and must never fail that action: every error is logged
//! and swallowed here, and the next qualifying action simply re-evaluates
//! from current aggregate state. Idempotence comes from the grant store's
//! `(user, badge)` uniqueness: a lost race inserts nothing and emits
//! nothing.

use std::sync::Arc;

use snipnet_core::{Badge, EngagementResult, UserId, BADGE_RULES};
use snipnet_storage::{AggregateSource, GrantStore};
use tracing::{debug, info, warn};

use crate::events::EngagementEvent;
use crate::hub::RealtimeHub;

/// Evaluates the fixed badge rule table against user aggregates.
pub struct AchievementEngine {
    aggregates: Arc<dyn AggregateSource>,
    grants: Arc<dyn GrantStore>,
    hub: Arc<RealtimeHub>,
}

impl AchievementEngine {
    /// Create an engine over the given aggregate source and grant store.
    pub fn new(
        aggregates: Arc<dyn AggregateSource>,
        grants: Arc<dyn GrantStore>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        Self {
            aggregates,
            grants,
            hub,
        }
    }

    /// Re-evaluate a user against every rule. Never fails; errors are
    /// logged and the evaluation is abandoned until the next trigger.
    pub async fn evaluate(&self, user_id: UserId) {
        match self.try_evaluate(user_id).await {
            Ok(newly_granted) => {
                if !newly_granted.is_empty() {
                    info!(
                        user_id,
                        badges = ?newly_granted.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
                        "Badges granted"
                    );
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "Badge evaluation failed; will retry on next qualifying action");
            }
        }
    }

    /// Evaluation body. Returns the badges actually granted by this call.
    async fn try_evaluate(&self, user_id: UserId) -> EngagementResult<Vec<Badge>> {
        let Some(aggregate) = self.aggregates.load(user_id).await? else {
            debug!(user_id, "Badge evaluation skipped: user not found");
            return Ok(Vec::new());
        };
        let already_granted = self.grants.granted(user_id).await?;

        let mut newly_granted = Vec::new();
        for rule in BADGE_RULES {
            if already_granted.contains(rule.badge_id) {
                continue;
            }
            if !(rule.predicate)(&aggregate) {
                continue;
            }

            // A concurrent evaluation may have won the race; `false` means
            // the badge was already held and nothing more happens.
            if self.grants.insert(user_id, rule.badge_id).await? {
                let badge = rule.badge();
                self.hub
                    .publish_to_user(user_id, EngagementEvent::badge_earned(badge.clone()));
                newly_granted.push(badge);
            }
        }
        Ok(newly_granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use snipnet_core::{StorageError, UserAggregate};
    use snipnet_storage::{InMemoryAggregateStore, InMemoryGrantStore};
    use snipnet_test_utils::AggregateBuilder;
    use std::collections::HashSet;

    fn engine_with(
        aggregates: Arc<InMemoryAggregateStore>,
        grants: Arc<InMemoryGrantStore>,
        hub: Arc<RealtimeHub>,
    ) -> AchievementEngine {
        AchievementEngine::new(aggregates, grants, hub)
    }

    #[tokio::test]
    async fn test_first_snippet_then_rising_star() {
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = engine_with(aggregates.clone(), grants.clone(), hub);

        aggregates
            .upsert(AggregateBuilder::new(1).snippets(1).build())
            .await;
        engine.evaluate(1).await;

        let granted = grants.granted(1).await.expect("granted");
        assert_eq!(granted, HashSet::from(["first-snippet".to_string()]));

        // Later: reputation crosses 100. first-snippet must not re-grant.
        aggregates.update(1, |agg| agg.reputation = 100).await;
        engine.evaluate(1).await;

        let granted = grants.granted(1).await.expect("granted");
        assert_eq!(
            granted,
            HashSet::from(["first-snippet".to_string(), "rising-star".to_string()])
        );
    }

    #[tokio::test]
    async fn test_no_grant_below_threshold() {
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = engine_with(aggregates.clone(), grants.clone(), hub);

        aggregates
            .upsert(AggregateBuilder::new(2).reputation(99).build())
            .await;
        engine.evaluate(2).await;

        assert!(grants.granted(2).await.expect("granted").is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_is_a_noop() {
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = engine_with(aggregates, grants.clone(), hub);

        engine.evaluate(404).await;
        assert!(grants.granted(404).await.expect("granted").is_empty());
    }

    #[tokio::test]
    async fn test_notification_emitted_once_per_grant() {
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = engine_with(aggregates.clone(), grants, hub.clone());

        let (_conn, mut rx) = hub.register(3);
        let connected = rx.recv().await.expect("connected");
        assert_eq!(connected.event_type(), "connected");

        aggregates
            .upsert(AggregateBuilder::new(3).snippets(2).build())
            .await;
        engine.evaluate(3).await;
        // Second evaluation: badge already held, no second notification.
        engine.evaluate(3).await;

        let event = rx.recv().await.expect("badge event");
        match event {
            EngagementEvent::BadgeEarned { badge, message } => {
                assert_eq!(badge.id, "first-snippet");
                assert_eq!(message, "You earned the Novice Coder badge!");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_evaluations_grant_exactly_once() {
        let aggregates = Arc::new(InMemoryAggregateStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = Arc::new(engine_with(aggregates.clone(), grants.clone(), hub.clone()));

        let (_conn, mut rx) = hub.register(9);
        rx.recv().await.expect("connected");

        aggregates
            .upsert(
                AggregateBuilder::new(9)
                    .reputation(1000)
                    .snippets(1)
                    .build(),
            )
            .await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move { engine.evaluate(9).await }));
        }
        for handle in handles {
            handle.await.expect("task should not panic");
        }

        // All three rules qualify; each granted exactly once.
        let granted = grants.granted(9).await.expect("granted");
        assert_eq!(granted.len(), 3);

        // Exactly one notification per badge across all ten evaluations.
        let mut notified = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let EngagementEvent::BadgeEarned { badge, .. } = event {
                notified.push(badge.id);
            }
        }
        notified.sort();
        assert_eq!(notified, ["community-hero", "first-snippet", "rising-star"]);
    }

    /// Aggregate source that always fails, standing in for a database
    /// outage during evaluation.
    struct FailingAggregates;

    #[async_trait]
    impl AggregateSource for FailingAggregates {
        async fn load(&self, user_id: UserId) -> EngagementResult<Option<UserAggregate>> {
            Err(StorageError::Unavailable {
                reason: format!("load failed for {}", user_id),
            }
            .into())
        }
    }

    #[tokio::test]
    async fn test_evaluation_error_is_swallowed() {
        let grants = Arc::new(InMemoryGrantStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = AchievementEngine::new(Arc::new(FailingAggregates), grants, hub);

        // Must not panic or propagate.
        engine.evaluate(1).await;
    }
}

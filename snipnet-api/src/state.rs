//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use snipnet_engagement::{
    AchievementEngine, CoordinatorConfig, EngagementCoordinator, RealtimeHub, VoteLedger,
};
use snipnet_storage::{
    AggregateSource, CacheBackend, FailOpenCache, GrantStore, InMemoryAggregateStore,
    InMemoryCacheBackend, InMemoryGrantStore,
};

use crate::config::ApiConfig;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Entry point for every vote mutation and cached tally read.
    pub coordinator: Arc<EngagementCoordinator>,
    /// Fan-out hub; WebSocket connections register here.
    pub hub: Arc<RealtimeHub>,
    /// Raw cache backend, kept for health reporting (hit rate, entry count).
    pub cache_backend: Arc<dyn CacheBackend>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire a full in-process engagement stack from configuration.
    ///
    /// The cache backend and the record stores are in-memory; swapping in
    /// networked implementations is a matter of passing different trait
    /// objects to [`AppState::with_stores`].
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryCacheBackend::new()),
            Arc::new(InMemoryAggregateStore::new()),
            Arc::new(InMemoryGrantStore::new()),
        )
    }

    /// Wire the engagement stack over explicit backends.
    pub fn with_stores(
        config: &ApiConfig,
        cache_backend: Arc<dyn CacheBackend>,
        aggregates: Arc<dyn AggregateSource>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        let cache = FailOpenCache::with_timeout(cache_backend.clone(), config.cache_op_timeout);
        let ledger = Arc::new(VoteLedger::new());
        let hub = Arc::new(RealtimeHub::new());
        let badges = Arc::new(AchievementEngine::new(aggregates, grants, hub.clone()));
        let coordinator = Arc::new(EngagementCoordinator::new(
            ledger,
            cache,
            hub.clone(),
            badges,
            CoordinatorConfig {
                tally_ttl: config.tally_ttl,
            },
        ));

        Self {
            coordinator,
            hub,
            cache_backend,
            start_time: Instant::now(),
        }
    }
}

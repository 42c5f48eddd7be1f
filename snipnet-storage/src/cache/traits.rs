//! Cache backend trait and statistics.
//!
//! The cache fronts the system of record and is strictly an optimization:
//! callers that can fall back to the source of truth must never depend on it
//! for correctness. Backends report errors so the fail-open wrapper can log
//! them, but no error escapes past that wrapper.

use async_trait::async_trait;
use serde_json::Value;
use snipnet_core::EngagementResult;
use std::time::Duration;

/// Cache backend trait for pluggable implementations.
///
/// Keys are namespaced strings (see [`super::keys`]); values are JSON
/// snapshots. Implementations must be thread-safe and support concurrent
/// access.
///
/// # Pattern deletes
///
/// `delete_by_pattern` enumerates keys matching a `*` glob and deletes them.
/// It is only weakly atomic: a key created while the scan runs may or may
/// not be deleted. Callers use pattern deletes to bound staleness (the entry
/// is re-invalidated on the next write to the same derived key, or expires
/// by TTL), never for exact completeness.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from the cache. `None` is a miss.
    async fn get(&self, key: &str) -> EngagementResult<Option<Value>>;

    /// Put a value into the cache, optionally bounded by a TTL.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> EngagementResult<()>;

    /// Delete a single key. Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> EngagementResult<()>;

    /// Delete every key matching a `*` glob pattern; returns the count
    /// actually deleted.
    async fn delete_by_pattern(&self, pattern: &str) -> EngagementResult<u64>;

    /// Get cache statistics.
    async fn stats(&self) -> EngagementResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of entries dropped because their TTL lapsed.
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

//! In-memory cache backend.
//!
//! A TTL-capable map guarded by an async `RwLock`. Expired entries are
//! dropped lazily: a read that finds a lapsed entry reports a miss and the
//! entry is reaped on the next write-path operation that touches the map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use snipnet_core::{CacheError, EngagementResult};
use tokio::sync::RwLock;
// The tokio clock (not std) so entries expire under a paused test clock.
use tokio::time::Instant;

use super::traits::{CacheBackend, CacheStats};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory TTL cache backend.
///
/// Suitable for a single-process deployment and for tests; the
/// [`CacheBackend`] trait keeps the door open for a networked store without
/// touching callers.
#[derive(Debug, Default)]
pub struct InMemoryCacheBackend {
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl InMemoryCacheBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a `*` glob into an anchored regex.
    fn compile_pattern(pattern: &str) -> EngagementResult<Regex> {
        let mut regex = String::with_capacity(pattern.len() + 2);
        regex.push('^');
        let mut first = true;
        for part in pattern.split('*') {
            if !first {
                regex.push_str(".*");
            }
            regex.push_str(&regex::escape(part));
            first = false;
        }
        regex.push('$');

        Regex::new(&regex).map_err(|_| {
            CacheError::InvalidPattern {
                pattern: pattern.to_string(),
            }
            .into()
        })
    }

    /// Drop every expired entry. Called from write-path operations.
    fn reap_expired(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let reaped = (before - entries.len()) as u64;
        if reaped > 0 {
            self.expirations.fetch_add(reaped, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> EngagementResult<Option<Value>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.value.clone()))
            }
            // A lapsed entry is a miss; it is reaped by the next writer.
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> EngagementResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.reap_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> EngagementResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> EngagementResult<u64> {
        let matcher = Self::compile_pattern(pattern)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.reap_expired(&mut entries, now);
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> EngagementResult<CacheStats> {
        let entries = self.entries.read().await;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: entries.len() as u64,
            expirations: self.expirations.load(Ordering::Relaxed),
        })
    }
}

//! Fail-open cache wrapper.
//!
//! Every cache call on the request path goes through this wrapper. It bounds
//! each backend operation with a short timeout and degrades on any failure:
//! a `get` that errors or times out becomes a miss, a `set`/`delete` that
//! fails is logged and dropped. The caller falls back to the system of
//! record and the request succeeds either way.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::warn;

use super::traits::CacheBackend;

/// Default per-operation timeout. Cache round trips beyond this stall the
/// request path more than a recomputed read would.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// A [`CacheBackend`] wrapper that never propagates failure.
#[derive(Clone)]
pub struct FailOpenCache {
    backend: Arc<dyn CacheBackend>,
    op_timeout: Duration,
}

impl FailOpenCache {
    /// Wrap a backend with the default operation timeout.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_OP_TIMEOUT)
    }

    /// Wrap a backend with an explicit operation timeout.
    pub fn with_timeout(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    /// Get a raw value; errors and timeouts read as a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        match timeout(self.op_timeout, self.backend.get(key)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(key, error = %e, "Cache get failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(key, timeout_ms = self.op_timeout.as_millis() as u64, "Cache get timed out, treating as miss");
                None
            }
        }
    }

    /// Get and deserialize a typed snapshot; any failure reads as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                // A snapshot written by an older build deserializes as a miss.
                warn!(key, error = %e, "Cached value failed to deserialize, treating as miss");
                None
            }
        }
    }

    /// Store a typed snapshot; failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Cache set skipped: value failed to serialize");
                return;
            }
        };
        match timeout(self.op_timeout, self.backend.set(key, value, ttl)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(key, error = %e, "Cache set failed"),
            Err(_) => warn!(key, "Cache set timed out"),
        }
    }

    /// Delete a single key; failures are logged and swallowed.
    pub async fn delete(&self, key: &str) {
        match timeout(self.op_timeout, self.backend.delete(key)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(key, error = %e, "Cache delete failed"),
            Err(_) => warn!(key, "Cache delete timed out"),
        }
    }

    /// Pattern-delete; failures are logged and swallowed, count is
    /// best-effort.
    pub async fn delete_by_pattern(&self, pattern: &str) -> u64 {
        match timeout(self.op_timeout, self.backend.delete_by_pattern(pattern)).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                warn!(pattern, error = %e, "Cache pattern delete failed");
                0
            }
            Err(_) => {
                warn!(pattern, "Cache pattern delete timed out");
                0
            }
        }
    }
}

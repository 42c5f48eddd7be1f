//! SNIPNET Storage - cache backends and system-of-record seams.
//!
//! This crate owns the two derived-data layers under the engagement core:
//! the TTL key/value cache (with its fail-open request-path wrapper) and the
//! traits through which the core observes user aggregates and appends
//! achievement grants. In-memory implementations back tests and
//! single-process deployments.

pub mod cache;
pub mod records;

pub use cache::{
    keys, CacheBackend, CacheStats, FailOpenCache, InMemoryCacheBackend, DEFAULT_OP_TIMEOUT,
};
pub use records::{AggregateSource, GrantStore, InMemoryAggregateStore, InMemoryGrantStore};

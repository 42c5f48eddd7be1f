//! Key/value cache layer fronting the system of record.
//!
//! Structure:
//! - [`traits`]: the [`CacheBackend`] contract and statistics
//! - [`memory`]: in-memory TTL backend
//! - [`fail_open`]: the wrapper the request path actually uses
//! - [`keys`]: namespaced key construction

pub mod fail_open;
pub mod keys;
pub mod memory;
pub mod traits;

pub use fail_open::{FailOpenCache, DEFAULT_OP_TIMEOUT};
pub use memory::InMemoryCacheBackend;
pub use traits::{CacheBackend, CacheStats};

//! Error types for engagement-core operations

use thiserror::Error;

use crate::identity::{ItemId, UserId};

/// Errors from the system of record (aggregates, grants).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: ItemId },

    #[error("Grant insert failed for user {user_id}: {reason}")]
    GrantFailed { user_id: UserId, reason: String },

    #[error("Backing store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Cache layer errors.
///
/// These are never surfaced to callers of the coordinator; the cache is an
/// optimization and every operation on it fails open. They exist so the
/// fail-open wrapper has something concrete to log.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Cache operation '{operation}' timed out")]
    Timeout { operation: String },

    #[error("Serialization failed for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Invalid key pattern: {pattern}")]
    InvalidPattern { pattern: String },
}

/// Validation errors, the only class a caller ever sees.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown vote direction: {value}")]
    UnknownDirection { value: String },

    #[error("Actor is not authenticated")]
    Unauthenticated,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for the engagement core.
#[derive(Debug, Clone, Error)]
pub enum EngagementError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for engagement-core operations.
pub type EngagementResult<T> = Result<T, EngagementError>;

// =============================================================================
// TESTS
// =============================================================================

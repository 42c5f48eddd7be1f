//! SNIPNET Core - shared data types for the real-time engagement core.
//!
//! The engagement core sits behind the CRUD/auth layer of the snippet
//! sharing application and owns vote state, cache invalidation, live
//! fan-out, and achievement grants. This crate defines the vocabulary the
//! other crates share: identities, vote enums, aggregate snapshots, the
//! badge catalog, and the error taxonomy.

pub mod aggregate;
pub mod badge;
pub mod enums;
pub mod error;
pub mod identity;

pub use aggregate::{UserAggregate, VoteTally};
pub use badge::{rule_for, Badge, BadgeRule, BADGE_RULES};
pub use enums::{VoteDirection, VoteState};
pub use error::{CacheError, EngagementError, EngagementResult, StorageError, ValidationError};
pub use identity::{new_connection_id, BadgeId, ConnectionId, ItemId, ItemVersion, UserId};

//! Engagement domain: votes, realtime fan-out, achievements.
//!
//! This crate owns the live state of the platform. The [`VoteLedger`] is
//! the authoritative vote store, the [`RealtimeHub`] fans events out to
//! connected clients, the [`AchievementEngine`] grants badges, and the
//! [`EngagementCoordinator`] ties one user action into all three plus the
//! cache layer.

pub mod badges;
pub mod coordinator;
pub mod events;
pub mod hub;
pub mod ledger;

pub use badges::AchievementEngine;
pub use coordinator::{CoordinatorConfig, EngagementCoordinator};
pub use events::{EngagementEvent, Topic};
pub use hub::RealtimeHub;
pub use ledger::{VoteLedger, VoteOutcome};

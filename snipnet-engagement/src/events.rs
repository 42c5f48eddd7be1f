//! Engagement event types.
//!
//! Every event that reaches a live client is one of these variants,
//! JSON-serialized with a `type` tag. Vote updates fan out on the item's
//! topic; badge notifications are addressed to a single user.

use serde::{Deserialize, Serialize};
use snipnet_core::{Badge, ConnectionId, ItemId, ItemVersion, VoteTally};
use std::fmt;

/// A pub/sub topic, e.g. `item:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Topic carrying vote updates for one item.
    pub fn item(item_id: ItemId) -> Self {
        Topic(format!("item:{}", item_id))
    }

    /// Parse a client-supplied topic string. Only `item:{id}` topics are
    /// subscribable; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let id = raw.strip_prefix("item:")?;
        id.parse::<ItemId>().ok().map(Topic::item)
    }

    /// The raw topic string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    /// An item's vote tally changed. `version` increases with every
    /// mutation, so a client discards any broadcast older than its own
    /// pending optimistic update.
    VoteUpdate {
        /// The item whose tally changed.
        item_id: ItemId,
        /// Current upvote count.
        upvotes: u64,
        /// Current downvote count.
        downvotes: u64,
        /// Per-item version at the time of the mutation.
        version: ItemVersion,
    },

    /// The user earned a badge.
    BadgeEarned {
        /// Display metadata for the badge.
        badge: Badge,
        /// Human-readable congratulation.
        message: String,
    },

    /// Sent once when a connection is registered.
    Connected {
        /// The id assigned to this connection.
        connection_id: ConnectionId,
    },

    /// A server-side problem the client should know about (e.g. a rejected
    /// subscribe command).
    Error {
        /// Error message.
        message: String,
    },
}

impl EngagementEvent {
    /// Build a vote update from a tally snapshot.
    pub fn vote_update(item_id: ItemId, tally: VoteTally) -> Self {
        EngagementEvent::VoteUpdate {
            item_id,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            version: tally.version,
        }
    }

    /// Build a badge notification with the standard message.
    pub fn badge_earned(badge: Badge) -> Self {
        let message = format!("You earned the {} badge!", badge.name);
        EngagementEvent::BadgeEarned { badge, message }
    }

    /// Get the event type as a string for logging/debugging.
    pub fn event_type(&self) -> &'static str {
        match self {
            EngagementEvent::VoteUpdate { .. } => "vote_update",
            EngagementEvent::BadgeEarned { .. } => "badge_earned",
            EngagementEvent::Connected { .. } => "connected",
            EngagementEvent::Error { .. } => "error",
        }
    }
}

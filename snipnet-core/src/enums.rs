//! Enumerations shared across the engagement core.

use serde::{Deserialize, Serialize};

/// The direction of a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    /// An upvote ("thumbs up").
    Up,
    /// A downvote ("thumbs down").
    Down,
}

impl VoteDirection {
    /// The opposite direction, used when a vote is switched.
    pub fn opposite(self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

/// A user's resulting vote state on an item.
///
/// `None` covers both "never voted" and "vote toggled off"; the ledger does
/// not distinguish them once the record is gone, and the UI renders both
/// identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    /// Currently upvoted.
    Up,
    /// Currently downvoted.
    Down,
    /// No active vote.
    #[default]
    None,
}

impl VoteState {
    /// Convert a direction into the equivalent active state.
    pub fn from_direction(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => VoteState::Up,
            VoteDirection::Down => VoteState::Down,
        }
    }

    /// The direction of the active vote, if any.
    pub fn direction(self) -> Option<VoteDirection> {
        match self {
            VoteState::Up => Some(VoteDirection::Up),
            VoteState::Down => Some(VoteDirection::Down),
            VoteState::None => None,
        }
    }
}

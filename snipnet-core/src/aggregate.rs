//! Aggregate counter types observed and produced by the engagement core.

use serde::{Deserialize, Serialize};

use crate::identity::{ItemVersion, UserId};

/// The up/down vote tally for an item, plus the item's version at the time
/// the snapshot was taken.
///
/// The score is always derived (`upvotes - downvotes`) and never stored, so
/// it cannot drift from the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Number of users with an active upvote.
    pub upvotes: u64,
    /// Number of users with an active downvote.
    pub downvotes: u64,
    /// Per-item version at snapshot time; bumps on every mutation.
    pub version: ItemVersion,
}

impl VoteTally {
    /// Derived score. Can be negative.
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Read-only counters for a user, owned by the system of record.
///
/// The achievement engine reads these to evaluate threshold rules; nothing
/// in the engagement core ever writes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAggregate {
    /// The user these counters belong to.
    pub user_id: UserId,
    /// Accumulated reputation points.
    pub reputation: i64,
    /// Number of snippets the user has published.
    pub snippet_count: u64,
    /// Number of comments the user has written.
    pub comment_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_derived() {
        let tally = VoteTally {
            upvotes: 3,
            downvotes: 5,
            version: 8,
        };
        assert_eq!(tally.score(), -2);
        assert_eq!(VoteTally::default().score(), 0);
    }
}

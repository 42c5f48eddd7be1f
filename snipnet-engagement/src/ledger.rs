//! Authoritative vote state.
//!
//! The ledger owns, per item, the map of active votes and the derived
//! up/down counters. All mutations on one item are serialized behind a
//! per-item async mutex; mutations on different items never contend.
//!
//! Vote semantics ("toggle-off"): casting the same direction twice removes
//! the vote; casting the opposite direction switches it in place.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use snipnet_core::{ItemId, UserId, VoteDirection, VoteState, VoteTally};
use tokio::sync::Mutex;
use tracing::debug;

/// The result of a vote mutation: the caller's new state plus the fresh
/// aggregate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// The acting user's resulting vote state.
    pub state: VoteState,
    /// Aggregate counters and version after the mutation.
    pub tally: VoteTally,
}

/// Per-item vote state. Guarded by the item's mutex; counters are kept
/// incrementally and always equal the cardinality of the respective vote
/// sets.
#[derive(Debug, Default)]
struct ItemVotes {
    votes: HashMap<UserId, VoteDirection>,
    upvotes: u64,
    downvotes: u64,
    version: u64,
}

impl ItemVotes {
    fn tally(&self) -> VoteTally {
        VoteTally {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            version: self.version,
        }
    }

    fn decrement(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Up => self.upvotes -= 1,
            VoteDirection::Down => self.downvotes -= 1,
        }
    }

    fn increment(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Up => self.upvotes += 1,
            VoteDirection::Down => self.downvotes += 1,
        }
    }
}

/// Authoritative per-item vote ledger.
///
/// Items materialize lazily on first vote; an item nobody has voted on has
/// the zero tally.
#[derive(Debug, Default)]
pub struct VoteLedger {
    items: DashMap<ItemId, Arc<Mutex<ItemVotes>>>,
}

impl VoteLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn item_entry(&self, item_id: ItemId) -> Arc<Mutex<ItemVotes>> {
        self.items
            .entry(item_id)
            .or_insert_with(|| Arc::new(Mutex::new(ItemVotes::default())))
            .clone()
    }

    /// Cast a vote.
    ///
    /// - no existing record: create it and increment the direction's counter
    /// - same direction as the existing record: toggle-off (delete, decrement)
    /// - opposite direction: switch (decrement old, increment new)
    ///
    /// Every path bumps the item version.
    pub async fn cast_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        direction: VoteDirection,
    ) -> VoteOutcome {
        let entry = self.item_entry(item_id);
        let mut item = entry.lock().await;

        let state = match item.votes.get(&user_id).copied() {
            None => {
                item.votes.insert(user_id, direction);
                item.increment(direction);
                VoteState::from_direction(direction)
            }
            Some(existing) if existing == direction => {
                item.votes.remove(&user_id);
                item.decrement(direction);
                VoteState::None
            }
            Some(existing) => {
                item.votes.insert(user_id, direction);
                item.decrement(existing);
                item.increment(direction);
                VoteState::from_direction(direction)
            }
        };
        item.version += 1;

        debug!(item_id, user_id, state = ?state, version = item.version, "Vote cast");
        VoteOutcome {
            state,
            tally: item.tally(),
        }
    }

    /// Remove a user's vote. Idempotent: removing a non-existent vote is a
    /// no-op and does not bump the version, so an unchanged tally never
    /// supersedes a newer broadcast.
    ///
    /// Returns the tally and whether anything changed.
    pub async fn remove_vote(&self, item_id: ItemId, user_id: UserId) -> (VoteTally, bool) {
        let entry = self.item_entry(item_id);
        let mut item = entry.lock().await;

        let changed = match item.votes.remove(&user_id) {
            Some(direction) => {
                item.decrement(direction);
                item.version += 1;
                true
            }
            None => false,
        };

        debug!(item_id, user_id, changed, "Vote removed");
        (item.tally(), changed)
    }

    /// The acting user's current vote state on an item.
    pub async fn vote_state(&self, item_id: ItemId, user_id: UserId) -> VoteState {
        match self.items.get(&item_id) {
            Some(entry) => {
                let entry = entry.clone();
                let item = entry.lock().await;
                item.votes
                    .get(&user_id)
                    .copied()
                    .map(VoteState::from_direction)
                    .unwrap_or(VoteState::None)
            }
            None => VoteState::None,
        }
    }

    /// Aggregate snapshot for an item. Items nobody voted on report zeros.
    pub async fn tally(&self, item_id: ItemId) -> VoteTally {
        match self.items.get(&item_id) {
            Some(entry) => {
                let entry = entry.clone();
                let item = entry.lock().await;
                item.tally()
            }
            None => VoteTally::default(),
        }
    }
}

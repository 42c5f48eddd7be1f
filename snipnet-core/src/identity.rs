//! Identity types for SNIPNET entities

use uuid::Uuid;

/// Identifier for a votable item (snippet or comment).
/// Items are owned by the relational system of record, which assigns
/// sequential 64-bit ids; this core only references them.
pub type ItemId = i64;

/// Identifier for a user account, assigned by the system of record.
pub type UserId = i64;

/// Identifier for a live client connection (one browser tab / socket).
/// UUIDv7 embeds a Unix timestamp, making ids naturally sortable by
/// connection time.
pub type ConnectionId = Uuid;

/// Stable string identifier for a badge (e.g. `"first-snippet"`).
pub type BadgeId = &'static str;

/// Monotonically increasing per-item version, bumped on every vote
/// mutation. Clients use it to last-writer-wins-merge broadcasts against
/// their own optimistic updates.
pub type ItemVersion = u64;

/// Generate a new ConnectionId (timestamp-sortable UUIDv7).
pub fn new_connection_id() -> ConnectionId {
    Uuid::now_v7()
}

//! Namespaced cache key construction.
//!
//! All cache keys are built here so invalidation and population can never
//! disagree on a key's shape.

use snipnet_core::ItemId;

/// Key for an item's full snapshot: `item:{id}`.
pub fn item(item_id: ItemId) -> String {
    format!("item:{}", item_id)
}

/// Key for an item's vote tally: `item:{id}:votes`.
pub fn item_votes(item_id: ItemId) -> String {
    format!("item:{}:votes", item_id)
}

/// Pattern matching the sub-keys derived from one item (`item:{id}:*`).
/// The bare `item:{id}` snapshot key is deleted exactly; a trailing-star
/// pattern on the id itself would also sweep `item:420` when invalidating
/// item 42.
pub fn item_subkey_pattern(item_id: ItemId) -> String {
    format!("item:{}:*", item_id)
}

/// Key for one page of a feed listing: `feed:{sort}:{page}`.
pub fn feed_page(sort: &str, page: u32) -> String {
    format!("feed:{}:{}", sort, page)
}

/// Pattern matching every paginated feed listing.
pub fn feed_pattern() -> String {
    "feed:*".to_string()
}

//! Badge catalog and display metadata.
//!
//! The catalog is a fixed, ordered table. Rules are evaluated in order and
//! each badge is granted at most once per user; grants are never revoked.

use serde::{Deserialize, Serialize};

use crate::aggregate::UserAggregate;
use crate::identity::BadgeId;

/// Display metadata for a badge, sent to the user when earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Stable identifier, e.g. `"rising-star"`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description of how it was earned.
    pub description: String,
    /// Emoji icon.
    pub icon: String,
}

/// A threshold rule: a badge plus the predicate over a user's aggregate
/// counters that earns it.
pub struct BadgeRule {
    /// The badge this rule grants.
    pub badge_id: BadgeId,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Emoji icon.
    pub icon: &'static str,
    /// Threshold predicate; once satisfied the badge is granted.
    pub predicate: fn(&UserAggregate) -> bool,
}

impl BadgeRule {
    /// Materialize the display metadata for this rule.
    pub fn badge(&self) -> Badge {
        Badge {
            id: self.badge_id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
        }
    }
}

/// The fixed rule table, in evaluation order.
pub const BADGE_RULES: &[BadgeRule] = &[
    BadgeRule {
        badge_id: "first-snippet",
        name: "Novice Coder",
        description: "Created your first snippet",
        icon: "\u{1F331}",
        predicate: |agg| agg.snippet_count > 0,
    },
    BadgeRule {
        badge_id: "rising-star",
        name: "Rising Star",
        description: "Reached 100 Reputation",
        icon: "\u{2B50}",
        predicate: |agg| agg.reputation >= 100,
    },
    BadgeRule {
        badge_id: "community-hero",
        name: "Community Hero",
        description: "Reached 1000 Reputation",
        icon: "\u{1F451}",
        predicate: |agg| agg.reputation >= 1000,
    },
];

/// Look up a rule by badge id.
pub fn rule_for(badge_id: &str) -> Option<&'static BadgeRule> {
    BADGE_RULES.iter().find(|rule| rule.badge_id == badge_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_ids_are_unique() {
        let mut ids: Vec<_> = BADGE_RULES.iter().map(|r| r.badge_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BADGE_RULES.len());
    }

    #[test]
    fn test_first_snippet_predicate() {
        let rule = rule_for("first-snippet").expect("rule exists");
        let mut agg = UserAggregate::default();
        assert!(!(rule.predicate)(&agg));
        agg.snippet_count = 1;
        assert!((rule.predicate)(&agg));
    }

    #[test]
    fn test_reputation_thresholds() {
        let rising = rule_for("rising-star").expect("rule exists");
        let hero = rule_for("community-hero").expect("rule exists");

        let mut agg = UserAggregate {
            reputation: 99,
            ..Default::default()
        };
        assert!(!(rising.predicate)(&agg));
        agg.reputation = 100;
        assert!((rising.predicate)(&agg));
        assert!(!(hero.predicate)(&agg));
        agg.reputation = 1000;
        assert!((hero.predicate)(&agg));
    }

    #[test]
    fn test_badge_metadata_materialization() {
        let badge = rule_for("rising-star").expect("rule exists").badge();
        assert_eq!(badge.id, "rising-star");
        assert_eq!(badge.name, "Rising Star");
        assert!(badge.description.contains("100"));
    }
}

//! Realtime publish/subscribe hub.
//!
//! The hub tracks live connections keyed both by topic and by user identity
//! (one user may hold several connections: multiple tabs). Delivery is
//! best-effort and at-most-once per currently subscribed connection: there
//! is no durable queue, and a client that is offline at publish time
//! reconciles by re-reading on reconnect.
//!
//! Publish snapshots the subscriber set before sending and holds no lock
//! across deliveries, so one slow or dead connection cannot stall the rest.
//! Dead connections are pruned lazily when a send fails.

use std::collections::HashSet;

use dashmap::DashMap;
use snipnet_core::{new_connection_id, ConnectionId, UserId};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{EngagementEvent, Topic};

/// One registered connection: the channel to its socket task, its owner,
/// and the topics it watches.
struct Connection {
    user_id: UserId,
    sender: mpsc::UnboundedSender<EngagementEvent>,
    topics: HashSet<Topic>,
}

/// Topic- and identity-keyed fan-out broker.
#[derive(Default)]
pub struct RealtimeHub {
    connections: DashMap<ConnectionId, Connection>,
    topics: DashMap<Topic, HashSet<ConnectionId>>,
    users: DashMap<UserId, HashSet<ConnectionId>>,
}

impl RealtimeHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for a user. Returns the connection id and the
    /// receiver the socket task drains. The `Connected` event is queued
    /// immediately.
    pub fn register(
        &self,
        user_id: UserId,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<EngagementEvent>) {
        let connection_id = new_connection_id();
        let (sender, receiver) = mpsc::unbounded_channel();

        let _ = sender.send(EngagementEvent::Connected { connection_id });

        self.connections.insert(
            connection_id,
            Connection {
                user_id,
                sender,
                topics: HashSet::new(),
            },
        );
        self.users.entry(user_id).or_default().insert(connection_id);

        info!(%connection_id, user_id, "Connection registered");
        (connection_id, receiver)
    }

    /// Subscribe a connection to a topic. Unknown connections are ignored.
    pub fn subscribe(&self, connection_id: ConnectionId, topic: Topic) {
        let Some(mut connection) = self.connections.get_mut(&connection_id) else {
            return;
        };
        connection.topics.insert(topic.clone());
        drop(connection);

        self.topics
            .entry(topic.clone())
            .or_default()
            .insert(connection_id);
        debug!(%connection_id, %topic, "Subscribed");
    }

    /// Unsubscribe a connection from a topic. No-op if not subscribed.
    pub fn unsubscribe(&self, connection_id: ConnectionId, topic: &Topic) {
        if let Some(mut connection) = self.connections.get_mut(&connection_id) {
            connection.topics.remove(topic);
        }
        if let Some(mut subscribers) = self.topics.get_mut(topic) {
            subscribers.remove(&connection_id);
        }
        debug!(%connection_id, %topic, "Unsubscribed");
    }

    /// Publish an event to every connection currently subscribed to a
    /// topic. Returns the number of connections the event was queued for.
    pub fn publish(&self, topic: &Topic, event: EngagementEvent) -> usize {
        // Snapshot, then deliver without holding the map entry.
        let subscribers: Vec<ConnectionId> = match self.topics.get(topic) {
            Some(entry) => entry.iter().copied().collect(),
            None => return 0,
        };
        let (delivered, dead) = self.deliver(&subscribers, &event, topic.as_str());
        if !dead.is_empty() {
            if let Some(mut subscribers) = self.topics.get_mut(topic) {
                for connection_id in &dead {
                    subscribers.remove(connection_id);
                }
            }
        }
        delivered
    }

    /// Publish an event to every connection a user currently holds,
    /// regardless of topic subscriptions. Used for personal notifications.
    pub fn publish_to_user(&self, user_id: UserId, event: EngagementEvent) -> usize {
        let connections: Vec<ConnectionId> = match self.users.get(&user_id) {
            Some(entry) => entry.iter().copied().collect(),
            None => return 0,
        };
        let (delivered, dead) = self.deliver(&connections, &event, "user");
        if !dead.is_empty() {
            if let Some(mut connections) = self.users.get_mut(&user_id) {
                for connection_id in &dead {
                    connections.remove(connection_id);
                }
            }
        }
        delivered
    }

    /// Send to each target, collecting the ids that could not be reached.
    ///
    /// `disconnect` cleans up ids that still have a connection entry; ids
    /// with no entry at all (a subscribe that raced a disconnect) are left
    /// for the caller, which removes them from the set it snapshotted.
    fn deliver(
        &self,
        targets: &[ConnectionId],
        event: &EngagementEvent,
        destination: &str,
    ) -> (usize, Vec<ConnectionId>) {
        let mut delivered = 0;
        let mut dead = Vec::new();
        for connection_id in targets {
            match self.connections.get(connection_id) {
                Some(connection) => {
                    if connection.sender.send(event.clone()).is_ok() {
                        delivered += 1;
                    } else {
                        dead.push(*connection_id);
                    }
                }
                None => dead.push(*connection_id),
            }
        }

        for connection_id in &dead {
            self.disconnect(*connection_id);
        }

        debug!(
            event_type = event.event_type(),
            destination, delivered, "Published event"
        );
        (delivered, dead)
    }

    /// Remove a connection and every subscription it held.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let Some((_, connection)) = self.connections.remove(&connection_id) else {
            return;
        };

        for topic in &connection.topics {
            if let Some(mut subscribers) = self.topics.get_mut(topic) {
                subscribers.remove(&connection_id);
            }
        }
        if let Some(mut user_connections) = self.users.get_mut(&connection.user_id) {
            user_connections.remove(&connection_id);
        }

        info!(%connection_id, user_id = connection.user_id, "Connection removed");
    }

    /// Number of live subscriptions on a topic (test/observability helper).
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.topics
            .get(topic)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipnet_core::VoteTally;

    fn tally(upvotes: u64, downvotes: u64, version: u64) -> VoteTally {
        VoteTally {
            upvotes,
            downvotes,
            version,
        }
    }

    async fn drain_connected(rx: &mut mpsc::UnboundedReceiver<EngagementEvent>) {
        let event = rx.recv().await.expect("connected event");
        assert!(matches!(event, EngagementEvent::Connected { .. }));
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register(1);
        drain_connected(&mut rx).await;

        hub.subscribe(conn, Topic::item(42));
        let delivered = hub.publish(&Topic::item(42), EngagementEvent::vote_update(42, tally(1, 0, 1)));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.expect("event");
        assert_eq!(event.event_type(), "vote_update");
    }

    #[tokio::test]
    async fn test_non_subscriber_receives_nothing() {
        let hub = RealtimeHub::new();
        let (_conn, mut rx) = hub.register(1);
        drain_connected(&mut rx).await;

        // Never subscribed to item:42.
        let delivered = hub.publish(&Topic::item(42), EngagementEvent::vote_update(42, tally(1, 0, 1)));
        assert_eq!(delivered, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register(1);
        drain_connected(&mut rx).await;

        hub.subscribe(conn, Topic::item(7));
        hub.unsubscribe(conn, &Topic::item(7));

        let delivered = hub.publish(&Topic::item(7), EngagementEvent::vote_update(7, tally(0, 1, 1)));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_publish_to_user_reaches_all_tabs() {
        let hub = RealtimeHub::new();
        let (_c1, mut rx1) = hub.register(5);
        let (_c2, mut rx2) = hub.register(5);
        drain_connected(&mut rx1).await;
        drain_connected(&mut rx2).await;

        let badge = snipnet_core::rule_for("first-snippet")
            .expect("rule exists")
            .badge();
        let delivered = hub.publish_to_user(5, EngagementEvent::badge_earned(badge));
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.expect("event").event_type(), "badge_earned");
        assert_eq!(rx2.recv().await.expect("event").event_type(), "badge_earned");
    }

    #[tokio::test]
    async fn test_publish_to_user_does_not_reach_other_users() {
        let hub = RealtimeHub::new();
        let (_c1, mut rx1) = hub.register(5);
        let (_c2, mut rx2) = hub.register(6);
        drain_connected(&mut rx1).await;
        drain_connected(&mut rx2).await;

        let badge = snipnet_core::rule_for("first-snippet")
            .expect("rule exists")
            .badge();
        hub.publish_to_user(5, EngagementEvent::badge_earned(badge));

        assert!(rx1.recv().await.is_some());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_removes_all_subscriptions() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register(1);
        drain_connected(&mut rx).await;

        hub.subscribe(conn, Topic::item(1));
        hub.subscribe(conn, Topic::item(2));
        hub.disconnect(conn);

        assert_eq!(hub.subscriber_count(&Topic::item(1)), 0);
        assert_eq!(hub.subscriber_count(&Topic::item(2)), 0);
        assert_eq!(hub.publish(&Topic::item(1), EngagementEvent::vote_update(1, tally(1, 0, 1))), 0);
    }

    #[tokio::test]
    async fn test_dead_connection_pruned_on_failed_send() {
        let hub = RealtimeHub::new();
        let (conn, rx) = hub.register(1);
        hub.subscribe(conn, Topic::item(9));

        // Socket task gone: receiver dropped.
        drop(rx);

        let delivered = hub.publish(&Topic::item(9), EngagementEvent::vote_update(9, tally(1, 0, 1)));
        assert_eq!(delivered, 0);
        // Pruned lazily; a second publish sees no subscribers at all.
        assert_eq!(hub.subscriber_count(&Topic::item(9)), 0);
    }

    #[tokio::test]
    async fn test_publish_prunes_subscriber_with_no_connection() {
        let hub = RealtimeHub::new();
        // A subscribe that raced a disconnect leaves an id in the topic set
        // with no connection entry behind it.
        let stale = snipnet_core::new_connection_id();
        hub.topics.entry(Topic::item(4)).or_default().insert(stale);
        assert_eq!(hub.subscriber_count(&Topic::item(4)), 1);

        let delivered = hub.publish(&Topic::item(4), EngagementEvent::vote_update(4, tally(1, 0, 1)));
        assert_eq!(delivered, 0);
        // The dangling id must not survive the publish.
        assert_eq!(hub.subscriber_count(&Topic::item(4)), 0);
    }

    #[tokio::test]
    async fn test_publish_to_user_prunes_connection_with_no_entry() {
        let hub = RealtimeHub::new();
        let stale = snipnet_core::new_connection_id();
        hub.users.entry(7).or_default().insert(stale);

        let badge = snipnet_core::rule_for("first-snippet")
            .expect("rule exists")
            .badge();
        let delivered = hub.publish_to_user(7, EngagementEvent::badge_earned(badge));
        assert_eq!(delivered, 0);
        assert!(hub.users.get(&7).map(|set| set.is_empty()).unwrap_or(true));
    }

    #[tokio::test]
    async fn test_same_topic_events_arrive_in_publish_order() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register(1);
        drain_connected(&mut rx).await;
        hub.subscribe(conn, Topic::item(3));

        for version in 1..=5u64 {
            hub.publish(&Topic::item(3), EngagementEvent::vote_update(3, tally(version, 0, version)));
        }
        for expected in 1..=5u64 {
            match rx.recv().await.expect("event") {
                EngagementEvent::VoteUpdate { version, .. } => assert_eq!(version, expected),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }
}

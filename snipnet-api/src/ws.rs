//! WebSocket Event Streaming
//!
//! Clients connect here to receive live engagement events: vote tally
//! updates for the item topics they subscribe to, plus badge notifications
//! addressed to their user. The socket task bridges the hub's per-connection
//! channel to the wire and feeds subscribe/unsubscribe commands back into
//! the hub.
//!
//! Delivery is best-effort: there is no replay, and a client that was
//! offline reconciles by re-reading tallies after reconnecting.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use snipnet_core::{ConnectionId, UserId};
use snipnet_engagement::{EngagementEvent, RealtimeHub, Topic};
use tracing::{debug, info, warn};

use crate::auth::UserIdentity;
use crate::state::AppState;

/// Commands a client may send over the socket.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientCommand {
    /// Start receiving events for a topic, e.g. `item:42`.
    Subscribe { topic: String },
    /// Stop receiving events for a topic.
    Unsubscribe { topic: String },
}

/// GET /api/v1/ws - upgrade to a WebSocket event stream.
pub async fn ws_handler(
    State(state): State<AppState>,
    identity: UserIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity.0))
}

/// Drive one socket until either side closes it.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: UserId) {
    let (connection_id, mut events) = state.hub.register(user_id);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                // Hub dropped the sender: the connection was pruned.
                let Some(event) = event else { break };
                let Ok(text) = serde_json::to_string(&event) else {
                    warn!(%connection_id, event_type = event.event_type(), "Failed to serialize event");
                    continue;
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    debug!(%connection_id, "Socket send failed, closing");
                    break;
                }
            }
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(error) = handle_command(&state.hub, connection_id, &text) {
                            let Ok(text) = serde_json::to_string(&error) else { continue };
                            if sink.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ping/pong handled by axum; binary ignored
                    Some(Err(e)) => {
                        debug!(%connection_id, error = %e, "Socket receive error");
                        break;
                    }
                }
            }
        }
    }

    state.hub.disconnect(connection_id);
    info!(%connection_id, user_id, "Socket closed");
}

/// Apply one client command. Returns an error event to echo back when the
/// command is rejected.
fn handle_command(
    hub: &RealtimeHub,
    connection_id: ConnectionId,
    text: &str,
) -> Option<EngagementEvent> {
    let command: ClientCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(e) => {
            debug!(%connection_id, error = %e, "Rejected malformed command");
            return Some(EngagementEvent::Error {
                message: format!("Malformed command: {}", e),
            });
        }
    };

    match command {
        ClientCommand::Subscribe { topic } => match Topic::parse(&topic) {
            Some(topic) => {
                hub.subscribe(connection_id, topic);
                None
            }
            None => Some(EngagementEvent::Error {
                message: format!("Unknown topic: {}", topic),
            }),
        },
        ClientCommand::Unsubscribe { topic } => {
            if let Some(topic) = Topic::parse(&topic) {
                hub.unsubscribe(connection_id, &topic);
            }
            None
        }
    }
}

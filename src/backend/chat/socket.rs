/**
 * Chat Socket Transport
 *
 * The WebSocket endpoint every chat client connects to. Authentication
 * happens once, at the upgrade request, from handshake metadata (bearer
 * header or `token` query parameter), never as a framed message, and is not
 * re-checked per event. A refused credential means a refused connection;
 * there is no anonymous mode.
 *
 * # Connection lifecycle
 *
 * 1. Verify the credential; refuse the upgrade with 401 on any failure
 * 2. Split the socket; spawn a writer task draining the connection outbox
 * 3. Join the role's entry rooms and announce presence
 * 4. Dispatch inbound frames through the session manager until the peer
 *    closes or errors
 * 5. Announce offline, tear down room forwarders, let the writer drain
 *
 * Events from one connection are handled to completion in arrival order;
 * events from different connections interleave at I/O boundaries only.
 */

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::backend::auth::{verify_token, Principal};
use crate::backend::chat::presence;
use crate::backend::chat::rooms::{entry_rooms, RoomFeed};
use crate::backend::chat::session::{handle_event, Session};
use crate::backend::error::ChatError;
use crate::backend::server::state::AppState;
use crate::shared::event::{ClientEvent, ServerEvent};

/// Handle `GET /ws/chat`: authenticate the handshake, then upgrade
pub async fn chat_socket(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or_else(|| params.get("token").cloned())
        .ok_or_else(|| {
            tracing::warn!("chat socket refused: no credential in handshake");
            StatusCode::UNAUTHORIZED
        })?;

    let principal = verify_token(&token).map_err(|e| {
        tracing::warn!("chat socket refused: {e}");
        ChatError::authentication(e.to_string()).status_code()
    })?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, principal, socket)))
}

/// Extract a bearer credential from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Run one authenticated connection to completion
async fn handle_connection(state: AppState, principal: Principal, socket: WebSocket) {
    tracing::info!(
        "chat socket open for '{}' ({:?})",
        principal.username,
        principal.role
    );

    let (mut sink, mut stream) = socket.split();
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Writer: everything addressed to this connection goes out as one JSON
    // text frame per event
    let writer = tokio::spawn(async move {
        while let Some(event) = outbox_rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("failed to serialize server event: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(payload.into())).await.is_err() {
                // Peer is gone; remaining events have nowhere to go
                break;
            }
        }
    });

    let mut feed = RoomFeed::new(state.rooms.clone(), outbox.clone());
    for room in entry_rooms(&principal) {
        feed.join(&room);
    }

    presence::announce_online(&state.rooms, &principal);

    let mut session = Session::new(principal.clone());
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("chat socket read error for '{}': {e}", principal.username);
                break;
            }
        };
        match frame {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientEvent>(text.as_str()) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!("dropping unparseable frame: {e}");
                        continue;
                    }
                };
                if let Err(e) = handle_event(&state, &mut session, &mut feed, &outbox, event).await
                {
                    // The triggering event's effect is simply absent; the
                    // sender currently gets no failure signal
                    tracing::error!(
                        "dropping event from '{}': {e}",
                        session.principal().username
                    );
                }
            }
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; ping/pong is
            // answered by the websocket stack
            _ => {}
        }
    }

    presence::announce_offline(&state.rooms, &principal);
    drop(feed); // stops room forwarders
    drop(outbox); // lets the writer drain and exit
    let _ = writer.await;

    tracing::info!("chat socket closed for '{}'", principal.username);
}

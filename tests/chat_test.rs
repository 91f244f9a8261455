//! End-to-end chat subsystem tests
//!
//! Drives user and admin connections through the real session dispatcher,
//! room registry, and conversation store: everything the socket layer does
//! minus the WebSocket framing.

mod common;

use std::time::Duration;

use tokio::sync::mpsc;

use common::auth_helpers::{admin, user};
use common::database::TestDatabase;
use tienda::backend::auth::Principal;
use tienda::backend::chat::db;
use tienda::backend::chat::presence;
use tienda::backend::chat::rooms::{entry_rooms, Outbox, RoomFeed};
use tienda::backend::chat::session::{handle_event, Session};
use tienda::backend::server::AppState;
use tienda::shared::event::{ClientEvent, ServerEvent};

/// A connected chat client, wired the way `socket.rs` wires real ones
struct TestClient {
    session: Session,
    feed: RoomFeed,
    outbox: Outbox,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl TestClient {
    fn connect(state: &AppState, principal: Principal) -> Self {
        let (outbox, rx) = mpsc::unbounded_channel();
        let mut feed = RoomFeed::new(state.rooms.clone(), outbox.clone());
        for room in entry_rooms(&principal) {
            feed.join(&room);
        }
        presence::announce_online(&state.rooms, &principal);
        Self {
            session: Session::new(principal),
            feed,
            outbox,
            rx,
        }
    }

    async fn send(&mut self, state: &AppState, event: ClientEvent) {
        handle_event(state, &mut self.session, &mut self.feed, &self.outbox, event)
            .await
            .expect("event dispatch failed");
        // Let room forwarders drain into outboxes
        tokio::task::yield_now().await;
    }

    async fn recv(&mut self) -> ServerEvent {
        tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("connection outbox closed")
    }

    fn try_recv(&mut self) -> Option<ServerEvent> {
        self.rx.try_recv().ok()
    }

    fn disconnect(self, state: &AppState) {
        presence::announce_offline(&state.rooms, self.session.principal());
        // Dropping the feed tears down the room forwarders
    }
}

async fn test_state() -> (TestDatabase, AppState) {
    let database = TestDatabase::new().await;
    let state = AppState::new(database.pool().clone());
    (database, state)
}

#[tokio::test]
async fn test_full_support_conversation_flow() {
    let (_database, state) = test_state().await;

    // Admin is online first, watching the admins room
    let mut admin_client = TestClient::connect(&state, admin("a1", "root"));

    // User connects: presence reaches the admin
    let mut user_client = TestClient::connect(&state, user("u1", "maria"));
    tokio::task::yield_now().await;
    match admin_client.recv().await {
        ServerEvent::UserOnline {
            user_id,
            username,
            conversation_id,
        } => {
            assert_eq!(user_id, "u1");
            assert_eq!(username, "maria");
            assert_eq!(conversation_id, "user-u1");
        }
        other => panic!("expected user online, got {other:?}"),
    }

    // User says hello: the conversation id derives from the user's identity
    user_client
        .send(
            &state,
            ClientEvent::ChatMessage {
                message: "hello".to_string(),
                conversation_id: None,
                receiver_id: None,
            },
        )
        .await;

    // Echoed to the user's own room with the persisted id and timestamp
    let hello_id = match user_client.recv().await {
        ServerEvent::ChatMessage(outgoing) => {
            assert_eq!(outgoing.message.body, "hello");
            assert_eq!(outgoing.message.conversation_id, "user-u1");
            assert!(!outgoing.message.is_from_admin);
            assert!(!outgoing.timestamp.is_empty());
            outgoing.message.id
        }
        other => panic!("expected chat message, got {other:?}"),
    };

    // The idle admin hears about it without being in the room
    match admin_client.recv().await {
        ServerEvent::NewMessageNotification(notice) => {
            assert_eq!(notice.conversation_id, "user-u1");
            assert_eq!(notice.message, "hello");
            assert_eq!(notice.sender_username, "maria");
        }
        other => panic!("expected notification, got {other:?}"),
    }

    // Admin joins the conversation: history replay + read flip
    admin_client
        .send(&state, ClientEvent::JoinConversation("user-u1".to_string()))
        .await;
    match admin_client.recv().await {
        ServerEvent::ConversationHistory {
            conversation_id,
            messages,
        } => {
            assert_eq!(conversation_id, "user-u1");
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].id, hello_id);
        }
        other => panic!("expected history, got {other:?}"),
    }

    let stored = db::conversation_history(state_pool(&state), "user-u1", 100)
        .await
        .unwrap();
    assert!(stored[0].read, "joining must acknowledge user messages");

    // Admin replies into the active conversation; the user's channel gets it
    admin_client
        .send(
            &state,
            ClientEvent::ChatMessage {
                message: "how can I help?".to_string(),
                conversation_id: Some("user-u1".to_string()),
                receiver_id: Some("u1".to_string()),
            },
        )
        .await;
    match user_client.recv().await {
        ServerEvent::ChatMessage(outgoing) => {
            assert_eq!(outgoing.message.body, "how can I help?");
            assert!(outgoing.message.is_from_admin);
            assert_eq!(outgoing.message.receiver_id.as_deref(), Some("u1"));
        }
        other => panic!("expected chat message, got {other:?}"),
    }
    // The admin, as a room member, receives its own reply too
    match admin_client.recv().await {
        ServerEvent::ChatMessage(outgoing) => {
            assert_eq!(outgoing.message.body, "how can I help?")
        }
        other => panic!("expected chat message, got {other:?}"),
    }
    // Admin messages never raise admin notifications
    assert!(admin_client.try_recv().is_none());

    // Disconnect announces offline to the remaining admin
    user_client.disconnect(&state);
    tokio::task::yield_now().await;
    match admin_client.recv().await {
        ServerEvent::UserOffline { user_id, .. } => assert_eq!(user_id, "u1"),
        other => panic!("expected user offline, got {other:?}"),
    }
}

#[tokio::test]
async fn test_same_sender_messages_keep_order() {
    let (_database, state) = test_state().await;

    let mut admin_client = TestClient::connect(&state, admin("a1", "root"));
    admin_client
        .send(&state, ClientEvent::JoinConversation("user-u1".to_string()))
        .await;
    let _ = admin_client.recv().await; // empty history

    let mut user_client = TestClient::connect(&state, user("u1", "maria"));
    let _ = admin_client.recv().await; // user online

    for body in ["a", "b"] {
        user_client
            .send(
                &state,
                ClientEvent::ChatMessage {
                    message: body.to_string(),
                    conversation_id: None,
                    receiver_id: None,
                },
            )
            .await;
    }

    // Every viewer observes the sender's order, store order included
    let mut seen = Vec::new();
    while seen.len() < 2 {
        if let ServerEvent::ChatMessage(outgoing) = admin_client.recv().await {
            seen.push(outgoing.message.body);
        }
    }
    assert_eq!(seen, vec!["a", "b"]);

    let stored = db::conversation_history(state_pool(&state), "user-u1", 100)
        .await
        .unwrap();
    let bodies: Vec<&str> = stored.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["a", "b"]);
}

#[tokio::test]
async fn test_listing_reflects_activity_and_deletion_is_scoped() {
    let (_database, state) = test_state().await;

    let mut maria = TestClient::connect(&state, user("u1", "maria"));
    let mut jose = TestClient::connect(&state, user("u2", "jose"));

    maria
        .send(
            &state,
            ClientEvent::ChatMessage {
                message: "first".to_string(),
                conversation_id: None,
                receiver_id: None,
            },
        )
        .await;
    jose.send(
        &state,
        ClientEvent::ChatMessage {
            message: "second".to_string(),
            conversation_id: None,
            receiver_id: None,
        },
    )
    .await;

    let mut admin_client = TestClient::connect(&state, admin("a1", "root"));
    admin_client
        .send(&state, ClientEvent::RequestConversations)
        .await;
    match admin_client.recv().await {
        ServerEvent::ConversationsList(summaries) => {
            assert_eq!(summaries.len(), 2);
            // Most recent activity first
            assert_eq!(summaries[0].conversation_id, "user-u2");
            assert_eq!(summaries[0].counterpart_username, "jose");
            assert_eq!(summaries[1].conversation_id, "user-u1");
            assert_eq!(summaries[1].unread_count, 1);
        }
        other => panic!("expected conversations list, got {other:?}"),
    }

    // Deleting jose's conversation leaves maria's untouched
    admin_client
        .send(
            &state,
            ClientEvent::DeleteConversation {
                conversation_id: "user-u2".to_string(),
            },
        )
        .await;

    // Viewing user is told to close
    let mut saw_deleted = false;
    while let Some(event) = jose.try_recv() {
        match event {
            ServerEvent::ConversationDeleted { conversation_id } => {
                assert_eq!(conversation_id, "user-u2");
                saw_deleted = true;
            }
            ServerEvent::ChatMessage(_) => {} // own echo from earlier
            other => panic!("unexpected event for jose: {other:?}"),
        }
    }
    assert!(saw_deleted);

    assert!(db::conversation_history(state_pool(&state), "user-u2", 100)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        db::conversation_history(state_pool(&state), "user-u1", 100)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_unauthorized_socket_events_leave_no_trace() {
    let (_database, state) = test_state().await;

    let mut maria = TestClient::connect(&state, user("u1", "maria"));
    maria
        .send(
            &state,
            ClientEvent::ChatMessage {
                message: "mine".to_string(),
                conversation_id: None,
                receiver_id: None,
            },
        )
        .await;
    let _ = maria.recv().await; // own echo

    let mut jose = TestClient::connect(&state, user("u2", "jose"));
    let message_id = db::conversation_history(state_pool(&state), "user-u1", 100)
        .await
        .unwrap()[0]
        .id
        .clone();

    jose.send(
        &state,
        ClientEvent::DeleteMessage {
            message_id,
            conversation_id: "user-u1".to_string(),
        },
    )
    .await;
    jose.send(
        &state,
        ClientEvent::DeleteConversation {
            conversation_id: "user-u1".to_string(),
        },
    )
    .await;
    jose.send(&state, ClientEvent::RequestConversations).await;

    // Nothing deleted, nothing listed, nothing broadcast to the victim
    assert_eq!(
        db::conversation_history(state_pool(&state), "user-u1", 100)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(jose.try_recv().is_none());
    assert!(maria.try_recv().is_none());
}

fn state_pool(state: &AppState) -> &sqlx::SqlitePool {
    &state.pool
}

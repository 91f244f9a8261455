/**
 * Conversation Session Manager
 *
 * The stateful core of the chat subsystem. Each live connection owns a
 * [`Session`] value typed by role, and every inbound event is dispatched
 * through [`handle_event`] against that value.
 *
 * # State machine
 *
 * A user session has no state beyond its principal: its conversation id is
 * a pure function of its identity. An admin session moves between "no
 * conversation selected" and "viewing a conversation": `join conversation`
 * joins the conversation's room, replays history, flips unread messages to
 * read, and records the conversation as active for reply targeting. Joining
 * never requires leaving: an admin accumulates conversation rooms and only
 * the most recent join is the active one.
 *
 * # Failure semantics
 *
 * Admin-only events from user sessions, empty bodies, and unresolvable
 * targets are silently dropped (logged at debug level, nothing emitted to
 * the client). Store failures propagate to the socket loop, which logs them
 * and drops the event.
 */

use chrono::Utc;
use uuid::Uuid;

use crate::backend::auth::{Principal, Role};
use crate::backend::chat::db;
use crate::backend::chat::rooms::{Outbox, Room, RoomFeed};
use crate::backend::error::ChatError;
use crate::backend::server::state::AppState;
use crate::shared::chat::{
    conversation_id_for_user, user_id_from_conversation, ChatMessage, NewMessageNotice,
    OutgoingMessage,
};
use crate::shared::event::{ClientEvent, ServerEvent};

/// Joining a conversation replays at most this many messages
pub const HISTORY_LIMIT: i64 = 100;

/// Session state of one admin connection
#[derive(Debug)]
pub struct AdminSession {
    pub principal: Principal,
    /// Most recently joined conversation, the implicit reply target
    active_conversation: Option<String>,
}

impl AdminSession {
    pub fn active_conversation(&self) -> Option<&str> {
        self.active_conversation.as_deref()
    }
}

/// Session state of one regular user connection
#[derive(Debug)]
pub struct UserSession {
    pub principal: Principal,
}

impl UserSession {
    /// The one conversation this connection can ever write to
    pub fn conversation_id(&self) -> String {
        conversation_id_for_user(&self.principal.id)
    }
}

/// A connection's session, typed by role
///
/// Admin-only operations dispatch only on the `Admin` variant, so an
/// unauthorized event has no code path to take; it falls through to a
/// logged drop.
#[derive(Debug)]
pub enum Session {
    Admin(AdminSession),
    User(UserSession),
}

impl Session {
    pub fn new(principal: Principal) -> Self {
        match principal.role {
            Role::Admin => Session::Admin(AdminSession {
                principal,
                active_conversation: None,
            }),
            Role::User => Session::User(UserSession { principal }),
        }
    }

    pub fn principal(&self) -> &Principal {
        match self {
            Session::Admin(admin) => &admin.principal,
            Session::User(user) => &user.principal,
        }
    }
}

/// Dispatch one inbound event against a connection's session
pub async fn handle_event(
    state: &AppState,
    session: &mut Session,
    feed: &mut RoomFeed,
    outbox: &Outbox,
    event: ClientEvent,
) -> Result<(), ChatError> {
    match event {
        ClientEvent::RequestConversations => match session {
            Session::Admin(_) => send_conversation_list(state, outbox).await,
            Session::User(_) => drop_unauthorized("request conversations", session),
        },
        ClientEvent::JoinConversation(conversation_id) => match session {
            Session::Admin(admin) => {
                join_conversation(state, admin, feed, outbox, conversation_id).await
            }
            Session::User(_) => drop_unauthorized("join conversation", session),
        },
        ClientEvent::ChatMessage {
            message,
            conversation_id,
            receiver_id,
        } => send_chat_message(state, session, message, conversation_id, receiver_id).await,
        ClientEvent::RequestHistory => match session {
            Session::User(user) => send_user_history(state, user, outbox).await,
            Session::Admin(_) => drop_unauthorized("request history", session),
        },
        ClientEvent::DeleteMessage {
            message_id,
            conversation_id,
        } => match session {
            Session::Admin(_) => delete_message(state, message_id, conversation_id).await,
            Session::User(_) => drop_unauthorized("delete message", session),
        },
        ClientEvent::DeleteConversation { conversation_id } => match session {
            Session::Admin(admin) => {
                delete_conversation(state, admin, outbox, conversation_id).await
            }
            Session::User(_) => drop_unauthorized("delete conversation", session),
        },
    }
}

/// Role-gated event from an ineligible role: drop without replying
fn drop_unauthorized(event: &str, session: &Session) -> Result<(), ChatError> {
    tracing::debug!(
        "dropping '{event}' from connection of '{}' (not eligible)",
        session.principal().username
    );
    Ok(())
}

async fn send_conversation_list(state: &AppState, outbox: &Outbox) -> Result<(), ChatError> {
    let summaries = db::list_conversations(&state.pool).await?;
    let _ = outbox.send(ServerEvent::ConversationsList(summaries));
    Ok(())
}

async fn join_conversation(
    state: &AppState,
    admin: &mut AdminSession,
    feed: &mut RoomFeed,
    outbox: &Outbox,
    conversation_id: String,
) -> Result<(), ChatError> {
    tracing::info!(
        "admin '{}' joins conversation '{conversation_id}'",
        admin.principal.username
    );

    feed.join(&Room::ConversationChannel(conversation_id.clone()));

    let messages = db::conversation_history(&state.pool, &conversation_id, HISTORY_LIMIT).await?;
    let _ = outbox.send(ServerEvent::ConversationHistory {
        conversation_id: conversation_id.clone(),
        messages,
    });

    // A message landing between the fetch above and this flip may or may not
    // be included; the read receipt is eventually consistent, not strict.
    db::mark_conversation_read(&state.pool, &conversation_id).await?;

    admin.active_conversation = Some(conversation_id);
    Ok(())
}

async fn send_chat_message(
    state: &AppState,
    session: &mut Session,
    body: String,
    conversation_id: Option<String>,
    receiver_id: Option<String>,
) -> Result<(), ChatError> {
    let body = body.trim().to_string();
    if body.is_empty() {
        tracing::debug!("dropping empty chat message");
        return Ok(());
    }

    let (target, receiver_id) = match session {
        // A user connection writes to its own conversation, full stop; an
        // explicit target from the client is not trusted.
        Session::User(user) => {
            if conversation_id.as_deref().is_some_and(|c| c != user.conversation_id()) {
                tracing::debug!(
                    "ignoring foreign conversation target from user '{}'",
                    user.principal.username
                );
            }
            (user.conversation_id(), None)
        }
        Session::Admin(admin) => {
            let target = match conversation_id.or_else(|| admin.active_conversation.clone()) {
                Some(target) => target,
                None => {
                    tracing::debug!("dropping admin chat message with no target conversation");
                    return Ok(());
                }
            };
            let receiver = receiver_id
                .or_else(|| user_id_from_conversation(&target).map(str::to_string));
            (target, receiver)
        }
    };

    let principal = session.principal();
    let message = ChatMessage {
        id: Uuid::new_v4().to_string(),
        conversation_id: target.clone(),
        sender_id: principal.id.clone(),
        sender_username: principal.username.clone(),
        receiver_id,
        body,
        is_from_admin: principal.role.is_admin(),
        read: false,
        created_at: Utc::now(),
    };

    db::insert_message(&state.pool, &message).await?;

    let delivered = state.rooms.publish(
        &Room::ConversationChannel(target.clone()),
        ServerEvent::ChatMessage(OutgoingMessage::from(message.clone())),
    );
    tracing::debug!("chat message in '{target}' delivered to {delivered} sockets");

    // Idle admin clients learn about user messages without joining the room
    if !message.is_from_admin {
        state.rooms.publish(
            &Room::AdminBroadcast,
            ServerEvent::NewMessageNotification(NewMessageNotice {
                conversation_id: target,
                message: message.body.clone(),
                sender_id: message.sender_id.clone(),
                sender_username: message.sender_username.clone(),
            }),
        );
    }

    Ok(())
}

async fn send_user_history(
    state: &AppState,
    user: &UserSession,
    outbox: &Outbox,
) -> Result<(), ChatError> {
    let conversation_id = user.conversation_id();
    // The requester is the non-admin party, so nothing gets marked read here
    let messages = db::conversation_history(&state.pool, &conversation_id, HISTORY_LIMIT).await?;
    let _ = outbox.send(ServerEvent::ConversationHistory {
        conversation_id,
        messages,
    });
    Ok(())
}

async fn delete_message(
    state: &AppState,
    message_id: String,
    conversation_id: String,
) -> Result<(), ChatError> {
    let removed = db::delete_message(&state.pool, &message_id).await?;
    tracing::info!("deleted {removed} message(s) by id '{message_id}'");

    state.rooms.publish(
        &Room::ConversationChannel(conversation_id.clone()),
        ServerEvent::MessageDeleted {
            message_id,
            conversation_id,
        },
    );
    state
        .rooms
        .publish(&Room::AdminBroadcast, ServerEvent::RefreshConversations);
    Ok(())
}

async fn delete_conversation(
    state: &AppState,
    admin: &mut AdminSession,
    outbox: &Outbox,
    conversation_id: String,
) -> Result<(), ChatError> {
    let removed = db::delete_conversation(&state.pool, &conversation_id).await?;
    tracing::info!("deleted conversation '{conversation_id}' ({removed} messages)");

    let deleted = ServerEvent::ConversationDeleted {
        conversation_id: conversation_id.clone(),
    };
    // Viewers close the conversation, idle admins refresh their lists
    state
        .rooms
        .publish(&Room::ConversationChannel(conversation_id.clone()), deleted.clone());
    state.rooms.publish(&Room::AdminBroadcast, deleted);

    let _ = outbox.send(ServerEvent::ConversationDeletedSuccess {
        conversation_id: conversation_id.clone(),
    });

    if admin.active_conversation.as_deref() == Some(conversation_id.as_str()) {
        admin.active_conversation = None;
    }
    Ok(())
}

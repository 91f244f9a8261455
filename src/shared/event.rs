//! Socket Protocol Events
//!
//! The full set of frames exchanged over the chat socket, as adjacently
//! tagged JSON: `{"event": <name>, "data": <payload>}`. Event names must not
//! drift; the storefront clients dispatch on them verbatim.
//!
//! # Direction
//!
//! `ClientEvent` is everything a connection may send; role enforcement
//! happens at dispatch (see `backend::chat::session`), not here, so an
//! unauthorized frame parses fine and is then dropped.
//!
//! `ServerEvent` is everything the server emits, whether directly to the
//! requesting socket or fanned out through a room.

use serde::{Deserialize, Serialize};

use super::chat::{ChatMessage, ConversationSummary, NewMessageNotice, OutgoingMessage};

/// Frames a connection may send to the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Ask for the full conversation summary list (admin)
    #[serde(rename = "request conversations")]
    RequestConversations,

    /// Join a conversation room and fetch its history (admin)
    #[serde(rename = "join conversation")]
    JoinConversation(String),

    /// Send a message into a conversation
    #[serde(rename = "chat message")]
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        message: String,
        /// Explicit target conversation; admins must supply it, regular
        /// users always resolve to their own conversation
        #[serde(default)]
        conversation_id: Option<String>,
        /// Addressed user, when an admin replies
        #[serde(default)]
        receiver_id: Option<String>,
    },

    /// Ask for the caller's own conversation history (regular user)
    #[serde(rename = "request history")]
    RequestHistory,

    /// Delete a single message (admin)
    #[serde(rename = "delete message")]
    #[serde(rename_all = "camelCase")]
    DeleteMessage {
        message_id: String,
        conversation_id: String,
    },

    /// Delete a whole conversation (admin)
    #[serde(rename = "delete conversation")]
    #[serde(rename_all = "camelCase")]
    DeleteConversation { conversation_id: String },
}

/// Frames the server emits to connections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full summary list, answering `request conversations`
    #[serde(rename = "conversations list")]
    ConversationsList(Vec<ConversationSummary>),

    /// Ordered history of one conversation
    #[serde(rename = "conversation history")]
    #[serde(rename_all = "camelCase")]
    ConversationHistory {
        conversation_id: String,
        messages: Vec<ChatMessage>,
    },

    /// A freshly persisted message, fanned out to the conversation room
    #[serde(rename = "chat message")]
    ChatMessage(OutgoingMessage),

    /// Lightweight notice to the admins room about a user message
    #[serde(rename = "new message notification")]
    NewMessageNotification(NewMessageNotice),

    /// A message was removed from a conversation
    #[serde(rename = "message deleted")]
    #[serde(rename_all = "camelCase")]
    MessageDeleted {
        message_id: String,
        conversation_id: String,
    },

    /// A whole conversation was removed; viewers should close it
    #[serde(rename = "conversation deleted")]
    #[serde(rename_all = "camelCase")]
    ConversationDeleted { conversation_id: String },

    /// Direct acknowledgment to the admin who requested the deletion
    #[serde(rename = "conversation deleted success")]
    #[serde(rename_all = "camelCase")]
    ConversationDeletedSuccess { conversation_id: String },

    /// Hint: re-request the conversation list
    #[serde(rename = "refresh conversations")]
    RefreshConversations,

    /// A regular user's socket opened
    #[serde(rename = "user online")]
    #[serde(rename_all = "camelCase")]
    UserOnline {
        user_id: String,
        username: String,
        conversation_id: String,
    },

    /// A regular user's socket closed
    #[serde(rename = "user offline")]
    #[serde(rename_all = "camelCase")]
    UserOffline {
        user_id: String,
        username: String,
        conversation_id: String,
    },
}

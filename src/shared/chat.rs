//! Chat Message and Conversation Wire Types
//!
//! The persisted message projection and the derived conversation summary, as
//! they travel over the socket. Payload keys are camelCase to match the
//! storefront clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix that ties a conversation id to the user it belongs to.
///
/// Every user↔admin-pool conversation is keyed `"user-" + <user id>`, so any
/// admin can recover the user id from the conversation id alone.
pub const USER_CONVERSATION_PREFIX: &str = "user-";

/// Conversation id for a regular user's support conversation
pub fn conversation_id_for_user(user_id: &str) -> String {
    format!("{USER_CONVERSATION_PREFIX}{user_id}")
}

/// Recover the user id a conversation belongs to, if the id follows the
/// `"user-<id>"` convention
pub fn user_id_from_conversation(conversation_id: &str) -> Option<&str> {
    conversation_id.strip_prefix(USER_CONVERSATION_PREFIX)
}

/// A persisted chat message
///
/// `id` and `created_at` are assigned at persistence time. `read` tracks
/// admin-side acknowledgment only and never flips on admin-authored messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID (UUIDv4, assigned at insert)
    pub id: String,
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// User who sent the message
    pub sender_id: String,
    /// Sender's username at send time
    pub sender_username: String,
    /// Addressed user, when an admin replies; None for generic support
    /// messages from a plain user
    pub receiver_id: Option<String>,
    /// Message content
    #[serde(rename = "message")]
    pub body: String,
    /// Whether the sender held the admin role at send time
    pub is_from_admin: bool,
    /// Whether an admin has acknowledged the message
    pub read: bool,
    /// When the message was persisted
    pub created_at: DateTime<Utc>,
}

/// A chat message as broadcast to sockets: the persisted projection plus a
/// human-readable timestamp for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    /// `HH:MM:SS` rendering of `created_at`
    pub timestamp: String,
}

impl From<ChatMessage> for OutgoingMessage {
    fn from(message: ChatMessage) -> Self {
        let timestamp = message.created_at.format("%H:%M:%S").to_string();
        Self { message, timestamp }
    }
}

/// Lightweight new-message notice for idle admin clients
///
/// Carries just enough for an admin UI to decide whether to refresh its
/// conversation list without joining the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageNotice {
    pub conversation_id: String,
    pub message: String,
    pub sender_id: String,
    pub sender_username: String,
}

/// One row of the conversation listing
///
/// Derived, never stored: a grouping over messages by conversation id. The
/// counterpart is always the non-admin participant (see the aggregation in
/// `backend::chat::db`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: String,
    /// Body of the chronologically last message
    pub last_message: String,
    /// Creation time of the chronologically last message
    pub last_message_time: DateTime<Utc>,
    /// The regular user on the other side of the admin pool
    pub counterpart_id: String,
    pub counterpart_username: String,
    /// Messages with `is_from_admin = false` not yet acknowledged by an admin
    pub unread_count: i64,
}

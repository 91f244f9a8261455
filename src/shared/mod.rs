//! Shared Types
//!
//! Types that cross the wire between the chat server and its clients:
//! message and conversation projections, and the socket event protocol.

/// Message and conversation wire types
pub mod chat;

/// Socket protocol events
pub mod event;

pub use chat::{ChatMessage, ConversationSummary, NewMessageNotice, OutgoingMessage};
pub use event::{ClientEvent, ServerEvent};

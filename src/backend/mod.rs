//! Backend Module
//!
//! All server-side code for the storefront's support-chat subsystem: an
//! Axum server carrying the WebSocket chat transport, room-based broadcast
//! routing, and SQLite persistence for the conversation log.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Initialization, application state, configuration
//! - **`routes`** - HTTP route assembly
//! - **`chat`**   - The conversation subsystem (socket, sessions, rooms,
//!   presence, store)
//! - **`auth`**   - Credential verification (JWT → Principal)
//! - **`error`**  - The subsystem's failure taxonomy
//!
//! # State Management
//!
//! Shared state (`AppState`) holds the store's connection pool and the room
//! registry. Both are internally synchronized handles, cloned per
//! connection; per-connection state (the typed session, room memberships)
//! is owned by that connection's task and never shared.

/// Credential verification
pub mod auth;

/// Conversation routing, sessions, and persistence
pub mod chat;

/// Backend error types
pub mod error;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

pub use chat::socket::chat_socket;
pub use error::ChatError;
pub use server::{create_app, AppState, ServerConfig};

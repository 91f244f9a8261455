//! Tienda Support Chat
//!
//! The real-time support-chat subsystem of a small e-commerce storefront:
//! regular users talk to the admin pool over per-connection WebSockets,
//! messages persist to an append-only SQLite log, and admins work from a
//! derived conversation listing with unread counts.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types crossing between server and clients
//!   (messages, conversation summaries, the socket event protocol)
//! - **`backend`** - The Axum server: socket transport, typed sessions,
//!   room routing, presence, and the conversation store
//!
//! The surrounding storefront (accounts, catalog, carts, orders) runs in
//! separate services; this crate only verifies the credentials those
//! services issue.

/// Server-side code
pub mod backend;

/// Types shared with clients
pub mod shared;

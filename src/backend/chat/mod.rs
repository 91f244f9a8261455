//! Chat Subsystem
//!
//! The real-time conversation routing and persistence core: one-to-one
//! support conversations between regular users and the admin pool, carried
//! over per-connection WebSockets and fanned out through broadcast rooms.
//!
//! # Architecture
//!
//! ```text
//! chat/
//! ├── mod.rs      - Module exports
//! ├── socket.rs   - WebSocket endpoint and connection lifecycle
//! ├── session.rs  - Per-connection session state machine and dispatch
//! ├── rooms.rs    - Room routing and broadcast registry
//! ├── presence.rs - User online/offline announcements
//! └── db.rs       - Conversation store (messages + aggregation)
//! ```
//!
//! `socket` owns the transport, `session` owns the protocol semantics,
//! `rooms` owns fan-out, `db` owns durability. Presence sits on top of
//! `rooms` and touches nothing else.

/// Conversation store operations
pub mod db;

/// User online/offline announcements
pub mod presence;

/// Room routing and the broadcast registry
pub mod rooms;

/// Per-connection session state and event dispatch
pub mod session;

/// WebSocket endpoint
pub mod socket;

pub use rooms::{Room, RoomRegistry};
pub use session::Session;
pub use socket::chat_socket;

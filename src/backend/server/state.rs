/**
 * Application State
 *
 * The shared state every handler sees: the message store's connection pool
 * and the room registry. Both are cheaply clonable handles; the state is
 * cloned per connection, never locked as a whole.
 *
 * # Thread Safety
 *
 * - `SqlitePool` is an internally synchronized handle
 * - `RoomRegistry` synchronizes its channel map internally
 */

use sqlx::SqlitePool;

use crate::backend::chat::rooms::RoomRegistry;

/// Shared application state for the chat server
#[derive(Clone)]
pub struct AppState {
    /// Conversation store connection pool
    pub pool: SqlitePool,
    /// Live room channels
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            rooms: RoomRegistry::new(),
        }
    }
}

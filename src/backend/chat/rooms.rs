/**
 * Room Router
 *
 * Maps connections to broadcast groups. A room is a named fan-out target
 * backed by a `tokio::sync::broadcast` channel; a connection's membership in
 * a room determines which server events it receives.
 *
 * # Room assignment
 *
 * Membership is assigned once at connect time from the connection's
 * principal:
 *
 * - admins join the single shared [`Room::AdminBroadcast`] group
 * - regular users join exactly their private [`Room::UserChannel`]
 *
 * The only dynamic membership change afterwards is an admin accumulating
 * [`Room::ConversationChannel`] memberships through `join conversation`.
 */

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::backend::auth::{Principal, Role};
use crate::shared::chat::conversation_id_for_user;
use crate::shared::event::ServerEvent;

/// Name of the shared broadcast group every admin connection joins
pub const ADMINS_ROOM: &str = "admins";

/// Sending half of a connection's outbox; everything a connection is meant
/// to receive funnels through it
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Per-room broadcast channel capacity
const ROOM_CHANNEL_CAPACITY: usize = 100;

/// A broadcast target, as an explicit closed set
///
/// Replaces the ad hoc room-name string convention: routing code names the
/// *kind* of target and [`Room::key`] is the single translation to the
/// registry's string keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Room {
    /// The shared group of all connected admins
    AdminBroadcast,
    /// One regular user's private channel, shared by all of that user's
    /// connections and tabs
    UserChannel(String),
    /// Every socket currently viewing one conversation
    ConversationChannel(String),
}

impl Room {
    /// Translate to the registry's string key.
    ///
    /// Invariant: `UserChannel(u)` and `ConversationChannel("user-" + u)`
    /// map to the same key. A user's private channel IS their conversation's
    /// room, so broadcasting to the conversation reaches the user's sockets
    /// without any extra routing.
    pub fn key(&self) -> String {
        match self {
            Room::AdminBroadcast => ADMINS_ROOM.to_string(),
            Room::UserChannel(user_id) => conversation_id_for_user(user_id),
            Room::ConversationChannel(conversation_id) => conversation_id.clone(),
        }
    }
}

/// Rooms a connection joins at connect time, based on its role
pub fn entry_rooms(principal: &Principal) -> Vec<Room> {
    match principal.role {
        Role::Admin => vec![Room::AdminBroadcast],
        Role::User => vec![Room::UserChannel(principal.id.clone())],
    }
}

/// Registry of live room channels
///
/// Channels are created lazily on first subscription and swept periodically
/// once every subscriber is gone. Can be cloned and shared across handlers.
#[derive(Clone)]
pub struct RoomRegistry {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<ServerEvent>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a room
    fn sender(&self, room: &Room) -> broadcast::Sender<ServerEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(room.key())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a room's event stream
    pub fn subscribe(&self, room: &Room) -> broadcast::Receiver<ServerEvent> {
        self.sender(room).subscribe()
    }

    /// Broadcast an event to every current member of a room
    ///
    /// # Returns
    ///
    /// Number of subscribers that received the event; 0 when the room has no
    /// members (which is not an error).
    pub fn publish(&self, room: &Room, event: ServerEvent) -> usize {
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(&room.key()).cloned()
        };
        match sender {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Current member count of a room
    pub fn subscriber_count(&self, room: &Room) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(&room.key())
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop channels with no remaining subscribers
    pub fn cleanup_idle(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    #[cfg(test)]
    fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One connection's view of its room memberships
///
/// Each joined room gets a forwarder task pumping that room's broadcast
/// stream into the connection's outbox. Joining the same room twice is a
/// no-op, so rejoining an already-viewed conversation never duplicates
/// deliveries. Forwarders stop on their own when the outbox closes; dropping
/// the feed aborts any that are still draining.
pub struct RoomFeed {
    registry: RoomRegistry,
    outbox: Outbox,
    joined: HashSet<String>,
    forwarders: Vec<JoinHandle<()>>,
}

impl RoomFeed {
    pub fn new(registry: RoomRegistry, outbox: Outbox) -> Self {
        Self {
            registry,
            outbox,
            joined: HashSet::new(),
            forwarders: Vec::new(),
        }
    }

    /// Join a room, wiring its broadcast stream into the connection outbox
    pub fn join(&mut self, room: &Room) {
        let key = room.key();
        if !self.joined.insert(key.clone()) {
            return;
        }

        let mut rx = self.registry.subscribe(room);
        let outbox = self.outbox.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if outbox.send(event).is_err() {
                            // Connection gone
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("room '{key}' feed lagged, skipped {skipped} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.forwarders.push(handle);
    }

    /// Whether this connection already belongs to a room
    pub fn is_member(&self, room: &Room) -> bool {
        self.joined.contains(&room.key())
    }
}

impl Drop for RoomFeed {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}

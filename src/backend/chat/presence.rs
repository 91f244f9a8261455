//! Presence Notifier
//!
//! Announces regular users' connects and disconnects to the admins room so
//! admin clients can refresh their conversation lists. Best-effort and never
//! persisted: a restart forgets everything. Presence is advisory, never a
//! correctness dependency, and admin connections are invisible here.

use crate::backend::auth::{Principal, Role};
use crate::backend::chat::rooms::{Room, RoomRegistry};
use crate::shared::chat::conversation_id_for_user;
use crate::shared::event::ServerEvent;

/// Announce a regular user's connection to the admins room
pub fn announce_online(rooms: &RoomRegistry, principal: &Principal) {
    if principal.role != Role::User {
        return;
    }
    let delivered = rooms.publish(
        &Room::AdminBroadcast,
        ServerEvent::UserOnline {
            user_id: principal.id.clone(),
            username: principal.username.clone(),
            conversation_id: conversation_id_for_user(&principal.id),
        },
    );
    tracing::debug!(
        "user '{}' online, notified {delivered} admin socket(s)",
        principal.username
    );
}

/// Announce a regular user's disconnection to the admins room
pub fn announce_offline(rooms: &RoomRegistry, principal: &Principal) {
    if principal.role != Role::User {
        return;
    }
    let delivered = rooms.publish(
        &Room::AdminBroadcast,
        ServerEvent::UserOffline {
            user_id: principal.id.clone(),
            username: principal.username.clone(),
            conversation_id: conversation_id_for_user(&principal.id),
        },
    );
    tracing::debug!(
        "user '{}' offline, notified {delivered} admin socket(s)",
        principal.username
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Principal {
        Principal {
            id: "u1".to_string(),
            username: "maria".to_string(),
            role: Role::User,
        }
    }

    fn admin() -> Principal {
        Principal {
            id: "a1".to_string(),
            username: "root".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_user_presence_reaches_admins_room() {
        let rooms = RoomRegistry::new();
        let mut admins_rx = rooms.subscribe(&Room::AdminBroadcast);

        announce_online(&rooms, &user());
        announce_offline(&rooms, &user());

        assert_eq!(
            admins_rx.recv().await.unwrap(),
            ServerEvent::UserOnline {
                user_id: "u1".to_string(),
                username: "maria".to_string(),
                conversation_id: "user-u1".to_string(),
            }
        );
        assert_eq!(
            admins_rx.recv().await.unwrap(),
            ServerEvent::UserOffline {
                user_id: "u1".to_string(),
                username: "maria".to_string(),
                conversation_id: "user-u1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_admin_connections_are_silent() {
        let rooms = RoomRegistry::new();
        let mut admins_rx = rooms.subscribe(&Room::AdminBroadcast);

        announce_online(&rooms, &admin());
        announce_offline(&rooms, &admin());

        assert!(admins_rx.try_recv().is_err());
    }
}

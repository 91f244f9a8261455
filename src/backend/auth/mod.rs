//! Authentication
//!
//! Credential verification for the chat subsystem. Token *issuance* lives in
//! the storefront's account service; this module only turns a presented
//! bearer credential into a [`Principal`] or refuses it. The check runs once
//! per connection at the socket handshake; the resulting principal is cached
//! on the session for the connection's lifetime.

use serde::{Deserialize, Serialize};

/// Session token handling (JWT)
pub mod sessions;

pub use sessions::{create_token, verify_token};

/// Role carried by a verified credential
///
/// Closed set: the storefront knows exactly two roles, and every role-gated
/// chat operation dispatches on this value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The authenticated identity attached to a connection
///
/// A projection of verified token claims, produced fresh per connection and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub role: Role,
}

/**
 * Chat Error Types
 *
 * This module defines the error taxonomy of the chat subsystem:
 *
 * - `Authentication` - invalid/missing/expired credential at connect time;
 *   the connection is refused outright, no partial session is created
 * - `Authorization` - a role-gated event from an ineligible role; dropped
 *   without a reply so unauthorized roles learn nothing about the protocol
 * - `Validation` - malformed event payload (empty body, missing target)
 * - `Persistence` - store read/write failure; logged, the triggering event
 *   is dropped
 * - `Serialization` - JSON encode/decode failure
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised inside the chat subsystem
#[derive(Debug, Error)]
pub enum ChatError {
    /// Credential rejected at connect time
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message
        message: String,
    },

    /// Role-gated event received from an ineligible role
    #[error("Authorization error: {message}")]
    Authorization {
        /// Human-readable error message
        message: String,
    },

    /// Event payload failed validation
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Store read or write failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// JSON serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatError {
    /// Create a new authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status for errors that surface at the handshake boundary
    ///
    /// Socket events never carry errors back to the client; only the upgrade
    /// request itself answers with a status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::Authorization { .. } => StatusCode::FORBIDDEN,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/**
 * Session Tokens (JWT)
 *
 * This module verifies the bearer credentials the storefront's account
 * service issues: HS256-signed JWTs carrying the user's id, username and
 * role, expiring 24 hours after issuance.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Principal, Role};

/// JWT claims structure
///
/// Claim names match the tokens the account service mints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Role at issuance time
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Get JWT secret from environment
fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET ({err}), using development default");
        "secret_key_default".to_string()
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Create a JWT token for a principal
///
/// Used by tests and by the out-of-scope account service; the chat server
/// itself only verifies.
///
/// # Returns
/// JWT token string
pub fn create_token(principal: &Principal) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();

    // Tokens expire in 24 hours
    let exp = now + 24 * 60 * 60;

    let claims = Claims {
        id: principal.id.clone(),
        username: principal.username.clone(),
        role: principal.role,
        exp,
        iat: now,
    };

    let secret = get_jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &key)
}

/// Verify a bearer credential and produce the principal it carries
///
/// Rejects missing/garbled tokens, bad signatures and expired tokens alike;
/// the caller must refuse the connection on any error. There is no anonymous
/// mode.
pub fn verify_token(token: &str) -> Result<Principal, jsonwebtoken::errors::Error> {
    let secret = get_jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    let claims = token_data.claims;

    Ok(Principal {
        id: claims.id,
        username: claims.username,
        role: claims.role,
    })
}

//! API token authentication
//!
//! Tokens are opaque random strings; only their SHA-256 digest is stored.

use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::constants::MSG_UNKNOWN_USER;
use crate::directory::principal_for;
use crate::error::{Result, WidgetError};
use crate::principal::Principal;
use crate::read::token_user;
use crate::tx::transact;
use crate::validate::field_error;

/// Authorization scheme keyword
pub const SCHEME: &str = "Token";

/// Generate a cryptographically secure token (32 bytes, hex encoded)
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).map_err(|e| WidgetError::Storage(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Hash token with SHA-256 for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hex encode
mod hex {
    pub fn encode(data: impl AsRef<[u8]>) -> String {
        data.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Issue a token for an existing user
pub fn issue_token(user: &Uuid) -> Result<String> {
    let token = generate_token()?;
    let digest = hash_token(&token);
    transact(|tx| {
        if tx.user(user)?.is_none() {
            return Err(field_error("user", MSG_UNKNOWN_USER));
        }
        tx.put_token(&digest, user)
    })?;
    debug!(%user, "token issued");
    Ok(token)
}

/// Revoke a token; false when it was unknown
pub fn revoke_token(token: &str) -> Result<bool> {
    let digest = hash_token(token);
    transact(|tx| tx.delete_token(&digest))
}

/// Resolve a presented token. No token is anonymous, an unknown one is an error.
pub fn authenticate(token: Option<&str>) -> Result<Principal> {
    let token = match token {
        Some(t) => t,
        None => return Ok(Principal::Anonymous),
    };
    let user = token_user(&hash_token(token))?.ok_or(WidgetError::InvalidToken)?;
    match principal_for(&user) {
        Err(WidgetError::NotFound) => Err(WidgetError::InvalidToken),
        other => other,
    }
}

/// Resolve an `Authorization` header value (`Token <token>`).
/// Other schemes are left to other authenticators and resolve to anonymous.
pub fn authenticate_header(header: Option<&str>) -> Result<Principal> {
    let header = match header {
        Some(h) => h,
        None => return Ok(Principal::Anonymous),
    };
    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(s) if s.eq_ignore_ascii_case(SCHEME) => {}
        _ => return Ok(Principal::Anonymous),
    }
    match (parts.next(), parts.next()) {
        (Some(token), None) => authenticate(Some(token)),
        _ => Err(WidgetError::InvalidToken),
    }
}

//! Anonymous caller identity.
//!
//! Callers are never authenticated. Instead each request is attributed to
//! a stable pseudonymous token hashed from connection metadata, which is
//! enough to deduplicate joins and attribute lobby ownership without
//! storing anything about the person behind the connection.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use crate::{AppConfig, AppError};

pub const DEFAULT_SALT: &str = "LetsQueue_2025";

/// Derives the anonymous token for a caller.
///
/// Deterministic and pure: the same (address, agent) pair always hashes
/// to the same token for the salt's lifetime. A missing agent string is
/// hashed as empty, not treated as an error.
pub fn derive_token(address: &str, agent: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{address}:{agent}:{salt}"));
    format!("{:x}", hasher.finalize())
}

/// The requester's derived identity, resolved server-side on every
/// request. Client-supplied token headers are never trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonIdentity(pub String);

impl<S> FromRequestParts<S> for AnonIdentity
where
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let address = client_address(parts);
        let agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Ok(AnonIdentity(derive_token(&address, agent, &config.anon_salt)))
    }
}

/// First `X-Forwarded-For` entry when a proxy put one there, otherwise
/// the socket peer address.
fn client_address(parts: &Parts) -> String {
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_deterministic() {
        let a = derive_token("203.0.113.9", "Mozilla/5.0", DEFAULT_SALT);
        let b = derive_token("203.0.113.9", "Mozilla/5.0", DEFAULT_SALT);
        assert_eq!(a, b);
    }

    #[test]
    fn token_is_lowercase_hex_sha256() {
        let token = derive_token("203.0.113.9", "Mozilla/5.0", DEFAULT_SALT);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn different_inputs_give_different_tokens() {
        let base = derive_token("203.0.113.9", "Mozilla/5.0", DEFAULT_SALT);
        assert_ne!(base, derive_token("203.0.113.10", "Mozilla/5.0", DEFAULT_SALT));
        assert_ne!(base, derive_token("203.0.113.9", "curl/8.0", DEFAULT_SALT));
        assert_ne!(base, derive_token("203.0.113.9", "Mozilla/5.0", "other-salt"));
    }

    #[test]
    fn empty_agent_is_allowed() {
        let token = derive_token("203.0.113.9", "", DEFAULT_SALT);
        assert_eq!(token.len(), 64);
    }
}

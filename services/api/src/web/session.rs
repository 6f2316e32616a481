//! services/api/src/web/session.rs
//!
//! Per-session anti-forgery tokens and the cookie plumbing that carries the
//! session identity.
//!
//! Tokens live in memory for the process lifetime; session expiry is handled
//! by whatever sits in front of a real deployment and is not modeled here.

use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session";

/// Issues and validates one anti-forgery token per session.
pub struct SessionTokens {
    tokens: RwLock<HashMap<String, String>>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the session's token, generating one on first use.
    ///
    /// Idempotent within a session's lifetime: repeated calls never change
    /// the value already issued.
    pub async fn issue(&self, session_id: &str) -> String {
        let mut tokens = self.tokens.write().await;
        tokens
            .entry(session_id.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    /// True only if `presented` is non-empty and exactly equals the token
    /// issued to this session. No case folding, no fallback token.
    pub async fn validate(&self, session_id: &str, presented: &str) -> bool {
        if presented.is_empty() {
            return false;
        }
        let tokens = self.tokens.read().await;
        tokens.get(session_id).is_some_and(|token| token == presented)
    }
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls the session id out of the request's cookie header, if present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .map(str::to_string)
}

/// Formats the Set-Cookie value binding a new session id to the caller.
pub fn new_session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; HttpOnly; SameSite=Lax; Path=/")
}

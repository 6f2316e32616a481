//! services/api/src/web/middleware.rs
//!
//! The two-stage authorization gate: a static API key check on every
//! request, then a CSRF double-submit check on state-changing methods.
//!
//! The API key layer wraps the CSRF layer in the router, so a request
//! lacking both credentials always reports the API key failure first.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::RequestError;
use crate::web::session;
use crate::web::state::AppState;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header echoing the session's anti-forgery token.
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";

/// Middleware validating the static API key on every non-preflight request.
///
/// A missing key and a wrong key deny with distinct status codes (401 vs
/// 403); nothing beyond those two categories is revealed.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, RequestError> {
    // Preflight requests carry no credentials.
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RequestError::ApiKeyMissing)?;

    if presented != state.config.api_key {
        return Err(RequestError::ApiKeyInvalid);
    }

    Ok(next.run(req).await)
}

/// Middleware validating the CSRF double-submit token on state-changing
/// methods. Safe methods pass through untouched.
pub async fn require_csrf(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, RequestError> {
    let method = req.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Whether the token is absent or merely wrong is not distinguished.
    let session_id = session::session_id(req.headers()).ok_or(RequestError::Csrf)?;
    let presented = req
        .headers()
        .get(CSRF_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.sessions.validate(&session_id, presented).await {
        return Err(RequestError::Csrf);
    }

    Ok(next.run(req).await)
}

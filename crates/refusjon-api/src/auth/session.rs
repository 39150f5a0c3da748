//! Session cookie handling.
//!
//! The session is just the identity API token stored in an HttpOnly cookie.
//! Handlers that need it take an explicit `Session` argument via the
//! extractor; successful GETs re-set the cookie so active users never expire.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use refusjon_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// 30 days.
pub const SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// An authenticated request context: the raw identity token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
}

/// Find the session token in a Cookie header.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Build the Set-Cookie value for a fresh session.
pub fn session_cookie(cookie_name: &str, token: &str, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        cookie_name,
        token,
        SESSION_TTL_SECS,
        if secure { "; Secure" } else { "" }
    )
}

/// Build the Set-Cookie value that clears the session.
pub fn clear_session_cookie(cookie_name: &str, secure: bool) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        cookie_name,
        if secure { "; Secure" } else { "" }
    )
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers, &state.config.session_cookie_name)
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized("Du er ikke logget inn".to_string()))
            })?;
        Ok(Session { token })
    }
}

/// Sliding session expiry: successful GETs re-set the cookie with a full TTL.
pub async fn refresh_session_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let refresh = request.method() == Method::GET;
    let token = token_from_headers(request.headers(), &state.config.session_cookie_name);

    let mut response = next.run(request).await;

    if refresh && response.status().is_success() {
        if let Some(token) = token {
            let cookie = session_cookie(
                &state.config.session_cookie_name,
                &token,
                state.is_production,
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }

    response
}

//! Login and logout.
//!
//! Login proxies the identity API and moves the returned token into an
//! HttpOnly session cookie; the token itself never reaches the client script
//! environment.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use refusjon_core::AppError;
use serde::Deserialize;

use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[tracing::instrument(skip(state, body), fields(operation = "login", username = %body.username))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, HttpAppError> {
    let token = state.identity.login(&body.username, &body.password).await?;

    let cookie = session_cookie(
        &state.config.session_cookie_name,
        &token,
        state.is_production,
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| AppError::Internal("Invalid session cookie value".to_string()))?;

    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

#[tracing::instrument(skip(state), fields(operation = "logout"))]
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let cookie = clear_session_cookie(&state.config.session_cookie_name, state.is_production);
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| AppError::Internal("Invalid session cookie value".to_string()))?;

    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

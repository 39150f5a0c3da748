//! Profile and membership proxy endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use refusjon_core::{Membership, UserProfile};
use serde::Serialize;

use crate::auth::Session;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Memberships keep the upstream's paginated list shape.
#[derive(Debug, Serialize)]
pub struct MembershipList {
    pub results: Vec<Membership>,
}

#[tracing::instrument(skip(state, session), fields(operation = "get_profile"))]
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<UserProfile>, HttpAppError> {
    let profile = state.identity.me(&session.token).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, session), fields(operation = "get_memberships"))]
pub async fn memberships(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<MembershipList>, HttpAppError> {
    let results = state.identity.memberships(&session.token).await?;
    Ok(Json(MembershipList { results }))
}

//! Legacy application endpoint.
//!
//! Kept for old clients: the form is accepted and acknowledged but feeds no
//! pipeline. Removing the route would break deployed frontends that still
//! post here.

use axum::{extract::Multipart, http::StatusCode};

use crate::error::HttpAppError;

#[tracing::instrument(skip(multipart), fields(operation = "submit_application"))]
pub async fn submit_application(mut multipart: Multipart) -> Result<StatusCode, HttpAppError> {
    // Drain the body so the client gets a clean 200 instead of a reset.
    while let Some(field) = multipart.next_field().await? {
        let _ = field.bytes().await?;
    }
    Ok(StatusCode::OK)
}

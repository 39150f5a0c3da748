//! Route configuration.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use refusjon_infra::{
    origin_guard_middleware, request_id_middleware, security_headers_middleware,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::session::refresh_session_middleware;
use crate::handlers;
use crate::state::AppState;

/// Assemble the full application router with its middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    // The whole batch arrives in one multipart body.
    let body_limit = state.config.max_file_size_bytes * state.config.max_upload_files;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/api/upload", post(handlers::upload::upload_images))
        .route("/api/send", post(handlers::expense::submit_expense))
        .route("/api/support", post(handlers::support::submit_support))
        .route("/api/hs-case", post(handlers::board_case::submit_board_case))
        .route(
            "/api/application",
            post(handlers::application::submit_application),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/users/me", get(handlers::users::me))
        .route("/users/me/memberships", get(handlers::users::memberships))
        .layer(ConcurrencyLimitLayer::new(1024))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.is_production,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(origin_guard_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            refresh_session_middleware,
        ))
        .with_state(state)
}

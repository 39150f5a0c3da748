//! Application setup and initialization.
//!
//! Everything main.rs needs to go from a validated `Config` to a bound
//! server: storage backend, upstream clients, the conversion ladder, and the
//! assembled router.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use refusjon_core::Config;
use refusjon_processing::ConversionLadder;

use crate::auth::IdentityClient;
use crate::clients::email::EmailClient;
use crate::state::AppState;

/// Initialize the entire application.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration before binding anything.
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::error::set_production_mode(config.is_production());

    let storage = refusjon_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    let http = reqwest::Client::new();
    let identity = IdentityClient::new(http.clone(), config.identity_api_url.clone());
    let email = EmailClient::new(
        http.clone(),
        config.email_api_url.clone(),
        config.email_api_key.clone(),
    );

    let is_production = config.is_production();
    let state = Arc::new(AppState {
        storage,
        ladder: Arc::new(ConversionLadder::standard()),
        identity,
        email,
        http,
        is_production,
        config,
    });

    tracing::info!("Application state initialized");

    let router = routes::build_router(state.clone());
    Ok((state, router))
}

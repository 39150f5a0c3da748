//! Application state.
//!
//! One `AppState` behind an `Arc`, cloned into every handler. Nothing in here
//! is request-scoped; per-request values (session, parsed submission) travel
//! as explicit handler arguments.

use std::path::PathBuf;
use std::sync::Arc;

use refusjon_core::Config;
use refusjon_processing::ConversionLadder;
use refusjon_storage::Storage;

use crate::auth::identity::IdentityClient;
use crate::clients::email::EmailClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub ladder: Arc<ConversionLadder>,
    pub identity: IdentityClient,
    pub email: EmailClient,
    /// Client for re-fetching receipt URLs in the submission pipeline.
    pub http: reqwest::Client,
    pub is_production: bool,
}

impl AppState {
    /// Directory generated PDFs are spooled to before upload.
    pub fn spool_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.spool_dir)
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}

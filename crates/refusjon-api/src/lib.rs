//! HTTP API for the reimbursement and submission portal.
//!
//! Handlers, the submission pipeline, external API clients, and application
//! setup live here; domain types and the ambient stack come from the other
//! workspace crates.

pub mod auth;
pub mod clients;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod pipeline;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;

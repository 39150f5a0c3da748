//! Refusjon Core Library
//!
//! Core domain models, error types, and configuration shared across all
//! refusjon components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AccountNumber, BoardCaseSubmission, ExpenseSubmission, Membership, SubmissionDate,
    SupportSubmission, SupportVariant, UserProfile,
};

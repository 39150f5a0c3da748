//! Blob storage for submitted receipts and generated documents.
//!
//! The `Storage` trait abstracts over S3 and the local filesystem. Keys use
//! the layout `documents/{timestamp}-{filename}`; generation is centralized
//! in the `keys` module so both backends stay consistent. Keys must not
//! contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_storage;
pub use keys::document_key;
pub use local::LocalStorage;
pub use refusjon_core::StorageBackend;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};

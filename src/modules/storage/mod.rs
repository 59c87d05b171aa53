//! Storage module for uploaded documents
//!
//! Provides a local filesystem blob store addressed by user, version and filename.

mod local_storage;

pub use local_storage::LocalStorage;

//! Versioned document storage.
//!
//! Every upload of a filename creates a new version; earlier versions stay
//! downloadable until the file is deleted.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::DocumentService;

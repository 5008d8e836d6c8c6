//! # murmur_core
//!
//! Core domain logic for Murmur: entity schemas, payload validation, the
//! document store and typed repositories.

pub mod migrate;
pub mod models;
pub mod object_id;
pub mod repository;
pub mod store;
pub mod validation;

pub use object_id::ObjectId;
pub use repository::{Listing, Repository};
pub use store::{Document, DocumentStore, Filter, SharedStore, StoreError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

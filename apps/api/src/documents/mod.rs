//! Folders, documents and the HTTP surface over them.

pub mod handlers;
pub mod naming;
pub mod repo;
pub mod store;

pub use store::{DocumentStore, PgDocumentStore, StoreError};

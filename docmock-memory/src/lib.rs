//! In-memory document storage backend for docmock.
//!
//! This crate provides the store every mock database runs on: a process-local
//! map from collection path to documents, guarded by an async-aware read-write
//! lock, plus the evaluator that applies filter, ordering, offset and limit
//! directives to a collection.
//!
//! # Quick Start
//!
//! ```ignore
//! use docmock_core::{backend::StoreBackendBuilder, database::Database};
//! use docmock_memory::InMemoryStore;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder()
//!         .with_json_seed(json!({ "users": { "alice": { "name": "Alice" } } }))?
//!         .build()
//!         .await?;
//!     let db = Database::new(backend);
//!
//!     let alice = db.doc("users/alice")?.get().await?;
//!     assert!(alice.exists());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmock_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder, Seed};

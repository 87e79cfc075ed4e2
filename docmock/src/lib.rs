//! In-memory stand-in for a document database client, for automated tests.
//!
//! This crate is the primary entry point. It re-exports the core types from
//! `docmock-core`, wires them to the in-memory backend from `docmock-memory`,
//! and provides [`create_mock`] to build a seeded database in one call.
//!
//! # Features
//!
//! - **Document and collection handles** - memoized per path, so handles compare by identity
//! - **CRUD** - `get`, `set` (replace or merge), `update` (no-op on missing documents), `delete`
//! - **Queries** - immutable filter/order/offset/limit chains with date-aware comparison
//! - **Write batches** - queued writes applied as one atomic step on commit
//! - **Timestamps** - a point-in-time value convertible to a date or millisecond count
//!
//! # Quick Start
//!
//! ```ignore
//! use docmock::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let db = create_mock_from_json(json!({
//!         "users": {
//!             "alice": { "name": "Alice", "age": 30 },
//!             "bob": { "name": "Bob", "age": 25 },
//!         },
//!     }))
//!     .await?;
//!
//!     let adults = db
//!         .collection("users")
//!         .filter("age", ">=", 18)
//!         .order_by("age", "desc")
//!         .get()
//!         .await?;
//!     assert_eq!(adults.ids(), vec!["alice", "bob"]);
//!
//!     let batch = db.batch();
//!     batch
//!         .delete(&db.doc("users/bob")?)
//!         .update(&db.doc("users/alice")?, fields_from_json(json!({ "age": 31 }))?);
//!     batch.commit().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Isolation
//!
//! Each database owns its store. Create a fresh one per test case; nothing is
//! shared between instances and nothing persists past the process.

pub mod prelude;

pub use docmock_core::{
    backend, batch, collection, database, document, error, path, query, snapshot, timestamp, value,
};
pub use docmock_core::{timestamp::Timestamp, value::{Fields, Value}};

use docmock_core::{
    backend::StoreBackendBuilder,
    batch::WriteBatch,
    collection::{CollectionRef, QueryRef},
    database::Database,
    document::DocumentRef,
    error::DocumentStoreResult,
    snapshot::{DocumentSnapshot, QuerySnapshot},
};

/// In-memory storage backend implementations.
pub mod memory {
    pub use docmock_memory::{InMemoryStore, InMemoryStoreBuilder, Seed};
}

use memory::{InMemoryStore, Seed};

/// A mock database running on the in-memory store.
pub type MockDatabase = Database<InMemoryStore>;
/// A document handle of a [`MockDatabase`].
pub type MockDocumentRef = DocumentRef<InMemoryStore>;
/// A collection handle of a [`MockDatabase`].
pub type MockCollectionRef = CollectionRef<InMemoryStore>;
/// A query chain of a [`MockDatabase`].
pub type MockQueryRef = QueryRef<InMemoryStore>;
/// The write batch of a [`MockDatabase`].
pub type MockWriteBatch = WriteBatch<InMemoryStore>;
/// A document read from a [`MockDatabase`].
pub type MockDocumentSnapshot = DocumentSnapshot<InMemoryStore>;
/// A query result from a [`MockDatabase`].
pub type MockQuerySnapshot = QuerySnapshot<InMemoryStore>;

/// Creates a mock database seeded with a copy of `seed`.
///
/// Later changes to `seed` do not affect the database.
pub async fn create_mock(seed: &Seed) -> DocumentStoreResult<MockDatabase> {
    let backend = InMemoryStore::builder()
        .with_seed(seed)
        .build()
        .await?;

    Ok(Database::new(backend))
}

/// Creates a mock database from a JSON seed shaped `{ collection: { id: { field: value } } }`.
///
/// Objects of the form `{ "seconds": s, "nanoseconds": n }` become [`Timestamp`]s.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`](error::DocumentStoreError::Serialization)
/// if the seed is not shaped as nested objects.
pub async fn create_mock_from_json(seed: serde_json::Value) -> DocumentStoreResult<MockDatabase> {
    let backend = InMemoryStore::builder()
        .with_json_seed(seed)?
        .build()
        .await?;

    Ok(Database::new(backend))
}

//! Entry point of the emulated database client.
//!
//! A [`Database`] owns one backend and the registries that memoize handles:
//! asking twice for the same collection path or document address returns the
//! same `Arc`, so handles attached to query results can be compared with
//! [`Arc::ptr_eq`] against handles obtained directly.
//!
//! # Example
//!
//! ```ignore
//! use docmock::prelude::*;
//!
//! let db = Database::new(backend);
//! let alice = db.doc("users/alice")?;
//! assert!(Arc::ptr_eq(&alice, &db.collection("users").doc("alice")?));
//! ```

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};
use tracing::debug;

use crate::{
    backend::{StoreBackend, StoreContents},
    batch::WriteBatch,
    collection::CollectionRef,
    document::DocumentRef,
    error::DocumentStoreResult,
    path::{Address, normalize_collection_path},
};

/// Handle caches owned by one [`Database`].
///
/// Handles point back here weakly, so dropping the database releases every
/// memoized handle.
pub(crate) struct Registry<B: StoreBackend> {
    backend: Arc<B>,
    collections: Mutex<HashMap<String, Arc<CollectionRef<B>>>>,
    documents: Mutex<HashMap<Address, Arc<DocumentRef<B>>>>,
}

impl<B: StoreBackend> Registry<B> {
    fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            collections: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
        }
    }

    fn collection(self: &Arc<Self>, path: &str) -> Arc<CollectionRef<B>> {
        let path = normalize_collection_path(path);

        self.collections
            .lock()
            .entry(path.clone())
            .or_insert_with(|| Arc::new(CollectionRef::new(path, self.backend.clone(), Arc::downgrade(self))))
            .clone()
    }

    fn document(self: &Arc<Self>, address: Address) -> Arc<DocumentRef<B>> {
        self.documents
            .lock()
            .entry(address.clone())
            .or_insert_with(|| Arc::new(DocumentRef::new(address, self.backend.clone(), Arc::downgrade(self))))
            .clone()
    }
}

/// Returns the memoized collection handle, or a detached one if the database is gone.
pub(crate) fn collection_handle<B: StoreBackend>(
    registry: &Weak<Registry<B>>,
    backend: &Arc<B>,
    path: &str,
) -> Arc<CollectionRef<B>> {
    match registry.upgrade() {
        Some(registry) => registry.collection(path),
        None => Arc::new(CollectionRef::new(normalize_collection_path(path), backend.clone(), Weak::new())),
    }
}

/// Returns the memoized document handle, or a detached one if the database is gone.
pub(crate) fn document_handle<B: StoreBackend>(
    registry: &Weak<Registry<B>>,
    backend: &Arc<B>,
    address: Address,
) -> Arc<DocumentRef<B>> {
    match registry.upgrade() {
        Some(registry) => registry.document(address),
        None => Arc::new(DocumentRef::new(address, backend.clone(), Weak::new())),
    }
}

/// An emulated database instance bound to one backend.
///
/// One instance per test: instances never share a backend unless the caller
/// deliberately hands the same one to two of them.
pub struct Database<B: StoreBackend> {
    registry: Arc<Registry<B>>,
    batch: Arc<WriteBatch<B>>,
}

impl<B: StoreBackend> Database<B> {
    /// Creates a database over the given backend.
    pub fn new(backend: B) -> Self {
        let backend = Arc::new(backend);
        debug!("created mock database");

        Self {
            batch: Arc::new(WriteBatch::new(backend.clone())),
            registry: Arc::new(Registry::new(backend)),
        }
    }

    /// Gets the collection handle for a path such as `users` or `users/alice/posts`.
    ///
    /// Repeated calls with the same path return the same handle.
    pub fn collection(&self, path: &str) -> Arc<CollectionRef<B>> {
        self.registry.collection(path)
    }

    /// Gets the document handle for a path such as `users/alice`.
    ///
    /// Repeated calls with the same path return the same handle.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`](crate::error::DocumentStoreError::InvalidPath)
    /// if the path lacks a collection or a document segment.
    pub fn doc(&self, path: &str) -> DocumentStoreResult<Arc<DocumentRef<B>>> {
        Ok(self.registry.document(Address::resolve(path)?))
    }

    /// Gets the write batch of this database.
    ///
    /// There is one batch per database; every call returns the same instance.
    pub fn batch(&self) -> Arc<WriteBatch<B>> {
        self.batch.clone()
    }

    /// Lists the paths of every collection in the store.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.registry.backend.list_collections().await
    }

    /// Returns a deep copy of the raw store contents.
    ///
    /// This is an inspection hook for test utilities, not part of the emulated client API.
    pub async fn contents(&self) -> DocumentStoreResult<StoreContents> {
        self.registry.backend.contents().await
    }

    /// The backend this database reads from and writes to.
    pub fn backend(&self) -> &B {
        &self.registry.backend
    }
}

impl<B: StoreBackend> fmt::Debug for Database<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.registry.backend)
            .finish()
    }
}

//! Document handles.
//!
//! A [`DocumentRef`] is bound to one [`Address`] and forwards reads and writes
//! to the backend. It caches nothing: every `get` observes the store as it is
//! at that moment.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{
    backend::{StoreBackend, Write},
    collection::CollectionRef,
    database::{Registry, collection_handle},
    error::DocumentStoreResult,
    path::Address,
    snapshot::DocumentSnapshot,
    value::Fields,
};

/// Options for [`DocumentRef::set_with`] and [`WriteBatch::set_with`](crate::batch::WriteBatch::set_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Shallow-merge the new fields over the existing document instead of replacing it.
    pub merge: bool,
}

impl SetOptions {
    /// Options requesting a merge.
    pub fn merge() -> Self {
        SetOptions { merge: true }
    }
}

/// A stable reference to one document.
///
/// Obtained from [`Database::doc`](crate::database::Database::doc) or
/// [`CollectionRef::doc`]; the same address always yields the same `Arc`.
pub struct DocumentRef<B: StoreBackend> {
    address: Address,
    backend: Arc<B>,
    registry: Weak<Registry<B>>,
}

impl<B: StoreBackend> DocumentRef<B> {
    pub(crate) fn new(address: Address, backend: Arc<B>, registry: Weak<Registry<B>>) -> Self {
        Self { address, backend, registry }
    }

    /// The document id.
    pub fn id(&self) -> &str {
        self.address.id()
    }

    /// The full `collection/id` path.
    pub fn path(&self) -> String {
        self.address.path()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The collection containing this document.
    pub fn parent(&self) -> Arc<CollectionRef<B>> {
        collection_handle(&self.registry, &self.backend, self.address.collection())
    }

    /// Gets the subcollection `name` nested under this document.
    pub fn collection(&self, name: &str) -> Arc<CollectionRef<B>> {
        collection_handle(&self.registry, &self.backend, &self.address.child_collection(name))
    }

    /// Reads the document.
    ///
    /// The snapshot reports `exists() == false` and no data if the document is absent.
    pub async fn get(self: &Arc<Self>) -> DocumentStoreResult<DocumentSnapshot<B>> {
        let data = self.backend.get_document(&self.address).await?;

        Ok(DocumentSnapshot::new(self.address.id().to_string(), data, self.clone()))
    }

    /// Replaces the document with `fields`, creating it if absent.
    pub async fn set(&self, fields: Fields) -> DocumentStoreResult<()> {
        self.set_with(fields, SetOptions::default()).await
    }

    /// Writes `fields`, either replacing the document or merging into it.
    ///
    /// With [`SetOptions::merge`], top-level fields are merged over the existing
    /// ones (new values win) and the document is created if absent.
    pub async fn set_with(&self, fields: Fields, options: SetOptions) -> DocumentStoreResult<()> {
        self.backend
            .commit_writes(vec![Write::Set {
                address: self.address.clone(),
                fields,
                merge: options.merge,
            }])
            .await
    }

    /// Shallow-merges `fields` into the document.
    ///
    /// Does nothing if the document does not exist; this is not an error.
    pub async fn update(&self, fields: Fields) -> DocumentStoreResult<()> {
        self.backend
            .commit_writes(vec![Write::Update { address: self.address.clone(), fields }])
            .await
    }

    /// Removes the document. Deleting a missing document does nothing.
    pub async fn delete(&self) -> DocumentStoreResult<()> {
        self.backend
            .commit_writes(vec![Write::Delete { address: self.address.clone() }])
            .await
    }
}

impl<B: StoreBackend> fmt::Debug for DocumentRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRef")
            .field("path", &self.address.path())
            .finish()
    }
}

//! Storage backend abstraction for the mock database.
//!
//! The handles in this crate ([`Database`](crate::database::Database),
//! [`DocumentRef`](crate::document::DocumentRef),
//! [`CollectionRef`](crate::collection::CollectionRef) and friends) never hold
//! document content themselves. Every read and write goes through a
//! [`StoreBackend`], which is the single owner of all document data.
//!
//! # Atomicity
//!
//! Each method is one atomic step with respect to every other method: a
//! backend must not let a reader observe a partially applied
//! [`commit_writes`](StoreBackend::commit_writes).

use async_trait::async_trait;
use indexmap::IndexMap;
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    path::Address,
    query::Query,
    value::Fields,
};

/// The documents of one collection, keyed by document id.
pub type CollectionContents = IndexMap<String, Fields>;

/// Raw store contents: collection path to documents.
pub type StoreContents = IndexMap<String, CollectionContents>;

/// A pending mutation against one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Replace the document, or shallow-merge into it when `merge` is set.
    /// Either way the document exists afterwards.
    Set {
        address: Address,
        fields: Fields,
        merge: bool,
    },
    /// Shallow-merge into the document only if it exists.
    Update {
        address: Address,
        fields: Fields,
    },
    /// Remove the document if it exists.
    Delete {
        address: Address,
    },
}

impl Write {
    /// The document this write targets.
    pub fn address(&self) -> &Address {
        match self {
            Write::Set { address, .. } | Write::Update { address, .. } | Write::Delete { address } => address,
        }
    }

    /// Short name of the write kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Write::Set { merge: true, .. } => "merge-set",
            Write::Set { .. } => "set",
            Write::Update { .. } => "update",
            Write::Delete { .. } => "delete",
        }
    }
}

/// Abstract interface for mock database storage.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug + 'static {
    /// Reads one document. `None` means the document does not exist.
    async fn get_document(&self, address: &Address) -> DocumentStoreResult<Option<Fields>>;

    /// Returns whether the document exists.
    async fn document_exists(&self, address: &Address) -> DocumentStoreResult<bool> {
        Ok(self.get_document(address).await?.is_some())
    }

    /// Evaluates a query against the current contents of `collection`.
    ///
    /// Returns `(id, fields)` pairs in result order. A collection that was never
    /// written to is an empty result, not an error.
    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<(String, Fields)>>;

    /// Applies `writes` in order as a single atomic step.
    async fn commit_writes(&self, writes: Vec<Write>) -> DocumentStoreResult<()>;

    /// Lists the paths of every collection bucket.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Returns a deep copy of the raw store contents.
    async fn contents(&self) -> DocumentStoreResult<StoreContents>;
}

/// Factory for backends that need asynchronous setup.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}

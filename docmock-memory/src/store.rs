//! In-memory storage implementation for the mock database.
//!
//! Documents live in nested maps (collection path to document id to fields)
//! behind an async-aware read-write lock. A document's presence in its
//! collection map is the only definition of existence.

use async_trait::async_trait;
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, trace};

use docmock_core::{
    backend::{CollectionContents, StoreBackend, StoreBackendBuilder, StoreContents, Write},
    error::{DocumentStoreError, DocumentStoreResult},
    path::{Address, normalize_collection_path},
    query::Query,
    value::{Fields, fields_from_json},
};

use crate::evaluator::DocumentEvaluator;

type StoreMap = StoreContents;

/// Initial contents for a store: collection path to document id to fields.
///
/// Collection paths may name subcollections (`users/alice/posts`).
pub type Seed = StoreContents;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state;
/// clones share the same underlying data. Every trait method takes the lock
/// once, so each read, write and batch commit is a single atomic step.
///
/// Queries scan the whole collection (no indexing).
///
/// # Example
///
/// ```ignore
/// use docmock_memory::InMemoryStore;
/// use docmock_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_json_seed(json!({ "users": { "alice": { "age": 30 } } }))?
///     .build()
///     .await?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection path -> (document id -> fields)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_contents(StoreMap::new())
    }

    /// Creates a builder for seeding the store before use.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn with_contents(contents: StoreMap) -> Self {
        Self {
            store: Arc::new(RwLock::new(contents)),
        }
    }
}

/// Returns the collection bucket at `path`, creating it if needed.
fn ensure_collection<'a>(store: &'a mut StoreMap, path: &str) -> &'a mut CollectionContents {
    store
        .entry(path.to_string())
        .or_default()
}

fn read_document<'a>(store: &'a StoreMap, address: &Address) -> Option<&'a Fields> {
    store
        .get(address.collection())?
        .get(address.id())
}

/// Replaces the document entirely.
fn write_document(store: &mut StoreMap, address: &Address, fields: Fields) {
    ensure_collection(store, address.collection())
        .insert(address.id().to_string(), fields);
}

/// Shallow-merges over the document, creating it if absent.
fn merge_document(store: &mut StoreMap, address: &Address, fields: Fields) {
    ensure_collection(store, address.collection())
        .entry(address.id().to_string())
        .or_default()
        .extend(fields);
}

/// Shallow-merges over the document only if it exists. Returns whether it did.
fn update_document(store: &mut StoreMap, address: &Address, fields: Fields) -> bool {
    match store
        .get_mut(address.collection())
        .and_then(|collection| collection.get_mut(address.id()))
    {
        Some(existing) => {
            existing.extend(fields);
            true
        },
        None => false,
    }
}

/// Removes the document if present. Returns whether it did.
fn delete_document(store: &mut StoreMap, address: &Address) -> bool {
    store
        .get_mut(address.collection())
        .and_then(|collection| collection.shift_remove(address.id()))
        .is_some()
}

fn apply_write(store: &mut StoreMap, write: Write) {
    trace!(kind = write.kind(), address = %write.address(), "applying write");

    match write {
        Write::Set { address, fields, merge: false } => write_document(store, &address, fields),
        Write::Set { address, fields, merge: true } => merge_document(store, &address, fields),
        Write::Update { address, fields } => {
            if !update_document(store, &address, fields) {
                trace!(address = %address, "update skipped, document does not exist");
            }
        },
        Write::Delete { address } => {
            delete_document(store, &address);
        },
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn get_document(&self, address: &Address) -> DocumentStoreResult<Option<Fields>> {
        let store = self.store.read().await;

        Ok(read_document(&store, address).cloned())
    }

    async fn document_exists(&self, address: &Address) -> DocumentStoreResult<bool> {
        let store = self.store.read().await;

        Ok(read_document(&store, address).is_some())
    }

    async fn query_documents(
        &self,
        query: &Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<(String, Fields)>> {
        let store = self.store.read().await;
        let collection_map = match store.get(&normalize_collection_path(collection)) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        // Filter, then order, then offset and limit; never truncate before ordering.
        let mut documents = DocumentEvaluator::filter_documents(collection_map.iter(), &query.filters);

        if let Some(sort) = &query.sort {
            DocumentEvaluator::sort_documents(&mut documents, sort);
        }

        Ok(
            documents
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .collect()
        )
    }

    async fn commit_writes(&self, writes: Vec<Write>) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let count = writes.len();

        for write in writes {
            apply_write(&mut store, write);
        }

        debug!(writes = count, "committed writes");

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn contents(&self) -> DocumentStoreResult<StoreContents> {
        Ok(self.store.read().await.clone())
    }
}

/// Builder for constructing seeded [`InMemoryStore`] instances.
///
/// Seed data is copied on entry, so the caller's seed can be changed or
/// dropped afterwards without affecting the store.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::builder()
///     .with_document("users", "alice", fields)
///     .build()
///     .await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryStoreBuilder {
    seed: StoreMap,
}

impl InMemoryStoreBuilder {
    /// Adds every collection and document of `seed`.
    ///
    /// Documents already added under the same address are replaced.
    pub fn with_seed(mut self, seed: &Seed) -> Self {
        for (path, documents) in seed {
            let collection = ensure_collection(&mut self.seed, &normalize_collection_path(path));

            for (id, fields) in documents {
                collection.insert(id.clone(), fields.clone());
            }
        }

        self
    }

    /// Adds one document.
    pub fn with_document(mut self, collection: &str, id: &str, fields: Fields) -> Self {
        ensure_collection(&mut self.seed, &normalize_collection_path(collection))
            .insert(id.to_string(), fields);

        self
    }

    /// Adds the documents of a JSON seed shaped `{ collection: { id: { field: value } } }`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if any level is not a JSON object.
    pub fn with_json_seed(mut self, seed: JsonValue) -> DocumentStoreResult<Self> {
        let JsonValue::Object(collections) = seed else {
            return Err(DocumentStoreError::Serialization(
                "seed must be an object keyed by collection path".to_string(),
            ));
        };

        for (path, documents) in collections {
            let JsonValue::Object(documents) = documents else {
                return Err(DocumentStoreError::Serialization(format!(
                    "seed collection {path:?} must be an object keyed by document id"
                )));
            };

            for (id, fields) in documents {
                self = self.with_document(&path, &id, fields_from_json(fields)?);
            }
        }

        Ok(self)
    }

    /// Adds the documents of a JSON seed given as text, such as a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if the text is not valid JSON
    /// or is not shaped as [`with_json_seed`](Self::with_json_seed) expects.
    pub fn with_json_seed_str(self, seed: &str) -> DocumentStoreResult<Self> {
        self.with_json_seed(serde_json::from_str(seed)?)
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds the store from the accumulated seed. This always succeeds.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        debug!(
            collections = self.seed.len(),
            documents = self.seed.values().map(IndexMap::len).sum::<usize>(),
            "seeded in-memory store"
        );

        Ok(InMemoryStore::with_contents(self.seed))
    }
}

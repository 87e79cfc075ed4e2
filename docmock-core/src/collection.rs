//! Collection handles and query chains.
//!
//! A [`CollectionRef`] names one collection path and hands out document
//! handles for it. Calling [`filter`](CollectionRef::filter),
//! [`order_by`](CollectionRef::order_by), [`offset`](CollectionRef::offset)
//! or [`limit`](CollectionRef::limit) starts a [`QueryRef`]: an immutable
//! chain of directives that is evaluated against the store only when
//! [`get`](QueryRef::get) is awaited.
//!
//! # Example
//!
//! ```ignore
//! let events = db.collection("events");
//! let upcoming = events.filter("date", ">=", Timestamp::now());
//!
//! // Branching never affects the shared prefix.
//! let first = upcoming.order_by("date", "asc").limit(1);
//! let all = upcoming.get().await?;
//! ```

use std::{
    fmt,
    sync::{Arc, Weak},
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    backend::StoreBackend,
    database::{Registry, document_handle},
    document::DocumentRef,
    error::DocumentStoreResult,
    path::{Address, split_collection_path},
    query::{Filter, Query, SortDirection, WhereOp},
    snapshot::{DocumentSnapshot, QuerySnapshot},
    value::{Fields, Value},
};

/// A handle to one collection.
pub struct CollectionRef<B: StoreBackend> {
    base: QueryRef<B>,
}

impl<B: StoreBackend> CollectionRef<B> {
    pub(crate) fn new(path: String, backend: Arc<B>, registry: Weak<Registry<B>>) -> Self {
        Self {
            base: QueryRef {
                collection: path,
                backend,
                registry,
                query: Query::new(),
            },
        }
    }

    /// The last segment of the collection path.
    pub fn id(&self) -> String {
        split_collection_path(&self.base.collection).1
    }

    /// The full collection path.
    pub fn path(&self) -> &str {
        &self.base.collection
    }

    /// The document owning this subcollection, or `None` for a root collection.
    pub fn parent(&self) -> Option<Arc<DocumentRef<B>>> {
        let (parent, _) = split_collection_path(&self.base.collection);

        parent.map(|address| document_handle(&self.base.registry, &self.base.backend, address))
    }

    /// Gets the handle of document `id` in this collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`](crate::error::DocumentStoreError::InvalidPath)
    /// if `id` is empty or contains a `/`.
    pub fn doc(&self, id: &str) -> DocumentStoreResult<Arc<DocumentRef<B>>> {
        let address = Address::new(&self.base.collection, id)?;

        Ok(document_handle(&self.base.registry, &self.base.backend, address))
    }

    /// Gets the handle of a new document with a random id.
    ///
    /// Nothing is written until the handle is used.
    pub fn new_doc(&self) -> Arc<DocumentRef<B>> {
        let id = Uuid::new_v4().simple().to_string();

        document_handle(
            &self.base.registry,
            &self.base.backend,
            Address::from_parts(&self.base.collection, &id),
        )
    }

    /// Writes `fields` as a new document with a random id and returns its handle.
    pub async fn add(&self, fields: Fields) -> DocumentStoreResult<Arc<DocumentRef<B>>> {
        let document = self.new_doc();
        document.set(fields).await?;

        Ok(document)
    }

    /// Starts a query with a filter directive. See [`QueryRef::filter`].
    pub fn filter(&self, field: &str, op: impl Into<WhereOp>, value: impl Into<Value>) -> QueryRef<B> {
        self.base.filter(field, op, value)
    }

    /// Starts a query with a prebuilt filter directive.
    pub fn filter_by(&self, filter: Filter) -> QueryRef<B> {
        self.base.filter_by(filter)
    }

    /// Starts a query with an ordering directive. See [`QueryRef::order_by`].
    pub fn order_by(&self, field: &str, direction: impl Into<SortDirection>) -> QueryRef<B> {
        self.base.order_by(field, direction)
    }

    /// Starts a query with an offset directive.
    pub fn offset(&self, offset: usize) -> QueryRef<B> {
        self.base.offset(offset)
    }

    /// Starts a query with a limit directive.
    pub fn limit(&self, limit: usize) -> QueryRef<B> {
        self.base.limit(limit)
    }

    /// Reads every document in the collection.
    pub async fn get(&self) -> DocumentStoreResult<QuerySnapshot<B>> {
        self.base.get().await
    }

    /// A query over this collection with no directives.
    pub fn query(&self) -> QueryRef<B> {
        self.base.clone()
    }
}

impl<B: StoreBackend> fmt::Debug for CollectionRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRef")
            .field("path", &self.base.collection)
            .finish()
    }
}

/// An immutable query over one collection.
///
/// Every chaining method takes `&self` and returns a new `QueryRef` carrying
/// all previous directives plus the new one.
pub struct QueryRef<B: StoreBackend> {
    collection: String,
    backend: Arc<B>,
    registry: Weak<Registry<B>>,
    query: Query,
}

impl<B: StoreBackend> QueryRef<B> {
    fn with_query(&self, query: Query) -> Self {
        Self {
            collection: self.collection.clone(),
            backend: self.backend.clone(),
            registry: self.registry.clone(),
            query,
        }
    }

    /// Adds a filter directive.
    ///
    /// `op` is one of `==`, `!=`, `<`, `<=`, `>`, `>=`, `in`, `not-in`,
    /// `array-contains`, `array-contains-any` (or a [`WhereOp`]). An unknown
    /// operator is accepted and matches no documents. The field `__name__`
    /// compares against the document id.
    pub fn filter(&self, field: &str, op: impl Into<WhereOp>, value: impl Into<Value>) -> Self {
        self.filter_by(Filter::new(field, op, value))
    }

    /// Adds a prebuilt filter directive.
    pub fn filter_by(&self, filter: Filter) -> Self {
        self.with_query(self.query.clone().filter(filter))
    }

    /// Orders results by `field`, replacing any previous ordering.
    ///
    /// `direction` accepts a [`SortDirection`] or the text `asc`/`desc`.
    pub fn order_by(&self, field: &str, direction: impl Into<SortDirection>) -> Self {
        self.with_query(self.query.clone().sort(field, direction.into()))
    }

    /// Skips the first `offset` ordered results, replacing any previous offset.
    pub fn offset(&self, offset: usize) -> Self {
        self.with_query(self.query.clone().offset(offset))
    }

    /// Keeps at most `limit` results, replacing any previous limit.
    ///
    /// The limit applies after filtering and ordering.
    pub fn limit(&self, limit: usize) -> Self {
        self.with_query(self.query.clone().limit(limit))
    }

    /// The directives accumulated so far.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The collection path this query runs over.
    pub fn collection_path(&self) -> &str {
        &self.collection
    }

    /// Evaluates the query against the current store contents.
    pub async fn get(&self) -> DocumentStoreResult<QuerySnapshot<B>> {
        let documents = self.backend
            .query_documents(&self.query, &self.collection)
            .await?;

        debug!(
            collection = %self.collection,
            filters = self.query.filters.len(),
            results = documents.len(),
            "evaluated query"
        );

        Ok(QuerySnapshot::new(
            documents
                .into_iter()
                .map(|(id, fields)| {
                    let reference = document_handle(
                        &self.registry,
                        &self.backend,
                        Address::from_parts(&self.collection, &id),
                    );

                    DocumentSnapshot::new(id, Some(fields), reference)
                })
                .collect()
        ))
    }
}

impl<B: StoreBackend> Clone for QueryRef<B> {
    fn clone(&self) -> Self {
        self.with_query(self.query.clone())
    }
}

impl<B: StoreBackend> fmt::Debug for QueryRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryRef")
            .field("collection", &self.collection)
            .field("query", &self.query)
            .finish()
    }
}

//! Materialized read results.
//!
//! Snapshots own copies of the data they were built from, so later writes to
//! the store never change a snapshot already handed out.

use std::{slice, sync::Arc, vec};

use crate::{
    backend::StoreBackend,
    document::DocumentRef,
    value::{Fields, Value, field_value},
};

/// The result of reading one document.
#[derive(Debug)]
pub struct DocumentSnapshot<B: StoreBackend> {
    id: String,
    data: Option<Fields>,
    reference: Arc<DocumentRef<B>>,
}

impl<B: StoreBackend> DocumentSnapshot<B> {
    pub(crate) fn new(id: String, data: Option<Fields>, reference: Arc<DocumentRef<B>>) -> Self {
        Self { id, data, reference }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the document existed when it was read.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    /// A copy of the document's fields, or `None` if it did not exist.
    pub fn data(&self) -> Option<Fields> {
        self.data.clone()
    }

    /// Borrows the document's fields without copying.
    pub fn fields(&self) -> Option<&Fields> {
        self.data.as_ref()
    }

    /// Reads a single (optionally dotted) field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        field_value(self.data.as_ref()?, field)
    }

    /// The memoized handle of the document this snapshot was read from.
    pub fn reference(&self) -> &Arc<DocumentRef<B>> {
        &self.reference
    }
}

impl<B: StoreBackend> Clone for DocumentSnapshot<B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            data: self.data.clone(),
            reference: self.reference.clone(),
        }
    }
}

/// The result of evaluating a query: matching documents in result order.
#[derive(Debug)]
pub struct QuerySnapshot<B: StoreBackend> {
    docs: Vec<DocumentSnapshot<B>>,
}

impl<B: StoreBackend> QuerySnapshot<B> {
    pub(crate) fn new(docs: Vec<DocumentSnapshot<B>>) -> Self {
        Self { docs }
    }

    pub fn docs(&self) -> &[DocumentSnapshot<B>] {
        &self.docs
    }

    /// Number of matching documents.
    pub fn size(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, DocumentSnapshot<B>> {
        self.docs.iter()
    }

    /// Visits every document in result order.
    pub fn for_each(&self, f: impl FnMut(&DocumentSnapshot<B>)) {
        self.docs.iter().for_each(f)
    }

    /// Ids of the matching documents in result order.
    pub fn ids(&self) -> Vec<&str> {
        self.docs.iter().map(DocumentSnapshot::id).collect()
    }
}

impl<B: StoreBackend> Clone for QuerySnapshot<B> {
    fn clone(&self) -> Self {
        Self { docs: self.docs.clone() }
    }
}

impl<B: StoreBackend> IntoIterator for QuerySnapshot<B> {
    type Item = DocumentSnapshot<B>;
    type IntoIter = vec::IntoIter<DocumentSnapshot<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl<'a, B: StoreBackend> IntoIterator for &'a QuerySnapshot<B> {
    type Item = &'a DocumentSnapshot<B>;
    type IntoIter = slice::Iter<'a, DocumentSnapshot<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

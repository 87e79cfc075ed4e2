//! Grouped atomic writes.
//!
//! A [`WriteBatch`] queues mutation intents without touching the store.
//! [`commit`](WriteBatch::commit) hands the whole queue to the backend as one
//! atomic step and leaves the batch empty and ready for reuse.

use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

use crate::{
    backend::{StoreBackend, Write},
    document::{DocumentRef, SetOptions},
    error::DocumentStoreResult,
    value::Fields,
};

/// A queue of pending writes applied together on commit.
///
/// # Example
///
/// ```ignore
/// let batch = db.batch();
/// batch
///     .delete(&db.doc("users/old")?)
///     .update(&db.doc("users/alice")?, fields);
/// batch.commit().await?;
/// ```
pub struct WriteBatch<B: StoreBackend> {
    backend: Arc<B>,
    writes: Mutex<Vec<Write>>,
}

impl<B: StoreBackend> WriteBatch<B> {
    pub(crate) fn new(backend: Arc<B>) -> Self {
        Self { backend, writes: Mutex::new(Vec::new()) }
    }

    /// Queues a full replace of the document.
    pub fn set(&self, reference: &DocumentRef<B>, fields: Fields) -> &Self {
        self.set_with(reference, fields, SetOptions::default())
    }

    /// Queues a replace or, with [`SetOptions::merge`], a shallow merge.
    pub fn set_with(&self, reference: &DocumentRef<B>, fields: Fields, options: SetOptions) -> &Self {
        self.push(Write::Set {
            address: reference.address().clone(),
            fields,
            merge: options.merge,
        })
    }

    /// Queues a shallow merge that only applies if the document exists at commit time.
    pub fn update(&self, reference: &DocumentRef<B>, fields: Fields) -> &Self {
        self.push(Write::Update { address: reference.address().clone(), fields })
    }

    /// Queues removal of the document.
    pub fn delete(&self, reference: &DocumentRef<B>) -> &Self {
        self.push(Write::Delete { address: reference.address().clone() })
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().is_empty()
    }

    /// Applies every queued write, in order, as one atomic step and empties the queue.
    ///
    /// Committing an empty batch is a no-op.
    pub async fn commit(&self) -> DocumentStoreResult<()> {
        let writes = std::mem::take(&mut *self.writes.lock());

        if writes.is_empty() {
            return Ok(());
        }

        debug!(writes = writes.len(), "committing write batch");

        self.backend.commit_writes(writes).await
    }

    fn push(&self, write: Write) -> &Self {
        trace!(kind = write.kind(), address = %write.address(), "queued batch write");
        self.writes.lock().push(write);
        self
    }
}

impl<B: StoreBackend> fmt::Debug for WriteBatch<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBatch")
            .field("writes", &*self.writes.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::Database, testing::RecordingBackend, value::Value};

    fn fields(key: &str, value: i64) -> Fields {
        let mut fields = Fields::new();
        fields.insert(key.to_string(), Value::from(value));
        fields
    }

    #[tokio::test]
    async fn commit_sends_queue_in_order_and_empties_it() {
        let db = Database::new(RecordingBackend::default());
        let a = db.doc("items/a").unwrap();
        let b = db.doc("items/b").unwrap();
        let batch = db.batch();

        batch
            .delete(&a)
            .update(&b, fields("n", 1))
            .set_with(&b, fields("m", 2), SetOptions::merge());
        assert_eq!(batch.len(), 3);
        assert!(db.backend().commits.lock().is_empty());

        batch.commit().await.unwrap();

        let commits = db.backend().commits.lock();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0].iter().map(Write::kind).collect::<Vec<_>>(),
            vec!["delete", "update", "merge-set"]
        );
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn empty_commit_reaches_no_backend() {
        let db = Database::new(RecordingBackend::default());

        db.batch().commit().await.unwrap();
        db.batch().set(&db.doc("items/a").unwrap(), fields("n", 1));
        db.batch().commit().await.unwrap();
        db.batch().commit().await.unwrap();

        assert_eq!(db.backend().commits.lock().len(), 1);
    }
}

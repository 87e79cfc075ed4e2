use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    backend::{StoreBackend, StoreContents, Write},
    error::DocumentStoreResult,
    path::Address,
    query::Query,
    value::Fields,
};

/// Backend that stores nothing and records every commit it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub commits: Mutex<Vec<Vec<Write>>>,
}

#[async_trait]
impl StoreBackend for RecordingBackend {
    async fn get_document(&self, _address: &Address) -> DocumentStoreResult<Option<Fields>> {
        Ok(None)
    }

    async fn query_documents(&self, _query: &Query, _collection: &str) -> DocumentStoreResult<Vec<(String, Fields)>> {
        Ok(vec![])
    }

    async fn commit_writes(&self, writes: Vec<Write>) -> DocumentStoreResult<()> {
        self.commits.lock().push(writes);
        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(vec![])
    }

    async fn contents(&self) -> DocumentStoreResult<StoreContents> {
        Ok(StoreContents::new())
    }
}

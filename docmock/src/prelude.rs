//! Convenient re-exports of commonly used types from docmock.
//!
//! ```ignore
//! use docmock::prelude::*;
//! ```

pub use crate::{
    create_mock, create_mock_from_json,
    memory::{InMemoryStore, InMemoryStoreBuilder, Seed},
    MockCollectionRef, MockDatabase, MockDocumentRef, MockDocumentSnapshot, MockQueryRef,
    MockQuerySnapshot, MockWriteBatch,
};

pub use docmock_core::{
    backend::{StoreBackend, StoreBackendBuilder, StoreContents, Write},
    batch::WriteBatch,
    collection::{CollectionRef, QueryRef},
    database::Database,
    document::{DocumentRef, SetOptions},
    error::{DocumentStoreError, DocumentStoreResult},
    path::Address,
    query::{Filter, Query, QueryVisitor, Sort, SortDirection, WhereOp, DOCUMENT_ID_FIELD},
    snapshot::{DocumentSnapshot, QuerySnapshot},
    timestamp::Timestamp,
    value::{Fields, Value, field_value, fields_from_json, fields_to_json},
};

//! Error types and result types for mock database operations.
//!
//! Almost nothing in an in-memory emulation can fail: there is no I/O and no
//! network. What remains is programmer error in the calling test code, such as
//! asking for a document with a path that names no document.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the mock database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The path does not contain both a collection segment and a document segment.
    #[error("Invalid document path: {0:?}")]
    InvalidPath(String),
    /// Untyped input (JSON seeds, JSON field data) could not be parsed or converted.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for mock database operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

//! Slash-delimited document addressing.
//!
//! An [`Address`] names one storage slot: the collection path (which may encode
//! nesting as `top/doc/sub`) and the document id within it. Subcollection paths
//! are built by joining a document's path with the child collection name, then
//! resolved again at the next level.

use std::fmt;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// A resolved (collection path, document id) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    collection: String,
    id: String,
}

impl Address {
    /// Resolves a document path such as `users/alice` or `users/alice/posts/p1`.
    ///
    /// The last segment is the document id and everything before it is the
    /// collection path. Empty segments (from leading, trailing or doubled
    /// slashes) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`] when fewer than two segments remain.
    pub fn resolve(path: &str) -> DocumentStoreResult<Self> {
        let segments = segments(path);

        match segments.split_last() {
            Some((id, collection)) if !collection.is_empty() => Ok(Self {
                collection: collection.join("/"),
                id: id.to_string(),
            }),
            _ => Err(DocumentStoreError::InvalidPath(path.to_string())),
        }
    }

    /// Builds the address of document `id` inside `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidPath`] if the id is empty or contains
    /// a separator, or if the collection path is empty.
    pub fn new(collection: &str, id: &str) -> DocumentStoreResult<Self> {
        let collection = normalize_collection_path(collection);

        if collection.is_empty() || id.is_empty() || id.contains(SEPARATOR) {
            return Err(DocumentStoreError::InvalidPath(format!("{collection}/{id}")));
        }

        Ok(Self { collection, id: id.to_string() })
    }

    /// Builds an address from parts already known to be canonical.
    pub(crate) fn from_parts(collection: &str, id: &str) -> Self {
        Self { collection: collection.to_string(), id: id.to_string() }
    }

    /// The collection path this document lives in.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full `collection/id` path.
    pub fn path(&self) -> String {
        format!("{}{SEPARATOR}{}", self.collection, self.id)
    }

    /// Path of the child collection `name` nested under this document.
    pub fn child_collection(&self, name: &str) -> String {
        let name = normalize_collection_path(name);
        format!("{}{SEPARATOR}{name}", self.path())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.collection, self.id)
    }
}

/// Canonical form of a collection path: empty segments removed.
pub fn normalize_collection_path(path: &str) -> String {
    segments(path).join("/")
}

/// Splits a collection path into its parent document address and own id.
///
/// `users` has no parent; `users/alice/posts` has parent `users/alice` and id `posts`.
pub fn split_collection_path(path: &str) -> (Option<Address>, String) {
    let segments = segments(path);

    match segments.split_last() {
        Some((id, parent)) if parent.len() >= 2 => {
            (Address::resolve(&parent.join("/")).ok(), id.to_string())
        }
        Some((id, _)) => (None, id.to_string()),
        None => (None, String::new()),
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_collection_and_id() {
        let address = Address::resolve("users/alice").unwrap();

        assert_eq!(address.collection(), "users");
        assert_eq!(address.id(), "alice");
        assert_eq!(address.path(), "users/alice");
    }

    #[test]
    fn nested_paths_keep_parent_segments_in_collection() {
        let address = Address::resolve("users/alice/posts/p1").unwrap();

        assert_eq!(address.collection(), "users/alice/posts");
        assert_eq!(address.id(), "p1");
    }

    #[test]
    fn fewer_than_two_segments_is_invalid() {
        assert_eq!(
            Address::resolve("users"),
            Err(DocumentStoreError::InvalidPath("users".to_string()))
        );
        assert!(Address::resolve("users/").is_err());
        assert!(Address::resolve("").is_err());
    }

    #[test]
    fn child_collection_extends_document_path() {
        let address = Address::resolve("users/alice").unwrap();

        assert_eq!(address.child_collection("posts"), "users/alice/posts");
    }

    #[test]
    fn new_rejects_ids_with_separators() {
        assert!(Address::new("users", "a/b").is_err());
        assert!(Address::new("users", "").is_err());
        assert_eq!(Address::new("/users/", "a").unwrap().path(), "users/a");
    }

    #[test]
    fn collection_paths_split_into_parent_and_id() {
        let (parent, id) = split_collection_path("users/alice/posts");

        assert_eq!(parent, Some(Address::resolve("users/alice").unwrap()));
        assert_eq!(id, "posts");
        assert_eq!(split_collection_path("users"), (None, "users".to_string()));
    }
}

use serde_json::{Map, Value};

use crate::store::error::StoreError;
use crate::store::path::{CollectionPath, DocumentPath};
use crate::store::watch::Watch;

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// A hierarchical document database: collections of documents keyed by
/// generated ids, where each document may own sub-collections.
pub trait DocumentStore {
    /// Create a document with a generated id and return that id.
    fn add(&self, collection: &CollectionPath, fields: Fields) -> Result<String, StoreError>;

    /// Every document of one collection, ordered by id.
    fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Merge top-level fields into an existing document.
    fn update(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Remove a document. Its sub-collections are left in place.
    fn delete(&self, document: &DocumentPath) -> Result<(), StoreError>;

    /// Deliver a snapshot of `collection` now and again after every write at
    /// or below it, until the returned guard is dropped.
    fn watch<F>(&self, collection: &CollectionPath, listener: F) -> Result<Watch, StoreError>
    where
        F: Fn(Vec<Document>) + Send + Sync + 'static;
}

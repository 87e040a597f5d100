use async_trait::async_trait;

use crate::record::{Fields, Record, RecordId};

use super::StoreResult;

/// A live document as returned by a collection.
///
/// Live documents are what a collection needs to act on a record it
/// already found, e.g. to remove it. Callers that only need data use
/// [`Document::to_record`].
pub trait Document: Send + Sync {
    /// The document's identifier.
    fn id(&self) -> &RecordId;

    /// Detached, serializable snapshot of the document.
    fn to_record(&self) -> Record;
}

/// Document collection supporting the CRUD primitives the adapter needs.
///
/// Implementations own schema validation and report failures through
/// [`StoreError`](super::StoreError) variants rather than panicking.
#[async_trait]
pub trait CollectionHandle: Send + Sync {
    type Document: Document;

    /// Finds a document by id. `Ok(None)` when no document has that id.
    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Self::Document>>;

    /// Returns every document in the collection.
    async fn find_all(&self) -> StoreResult<Vec<Self::Document>>;

    /// Validates and inserts a new document, assigning its id.
    async fn insert(&self, data: Fields) -> StoreResult<Self::Document>;

    /// Validates and merges `data` into an existing document.
    async fn update_by_id(&self, id: &RecordId, data: Fields) -> StoreResult<()>;

    /// Validates and replaces the content of an existing document.
    async fn replace_by_id(&self, id: &RecordId, data: Fields) -> StoreResult<()>;

    /// Removes a document previously returned by this collection.
    async fn remove_instance(&self, document: &Self::Document) -> StoreResult<()>;
}

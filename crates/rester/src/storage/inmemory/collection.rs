//! In-memory collection implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use rester_core::record::{Fields, Record, RecordId, Schema};
use rester_core::storage::{CollectionHandle, Document, StoreError, StoreResult};

/// Snapshot of a stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    id: RecordId,
    fields: Fields,
}

impl StoredDocument {
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl Document for StoredDocument {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn to_record(&self) -> Record {
        Record::new(&self.id, self.fields.clone())
    }
}

#[derive(Debug)]
struct Slot {
    seq: u64,
    fields: Fields,
}

/// In-memory collection for testing and demos.
///
/// Documents live in a `HashMap` behind `Arc<RwLock<_>>`; clones share
/// the same documents. Ids are UUID v4 strings and anything that does not
/// parse as a UUID is reported as [`StoreError::MalformedId`].
/// `find_all` returns documents in insertion order.
#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    name: Arc<str>,
    schema: Arc<Schema>,
    documents: Arc<RwLock<HashMap<RecordId, Slot>>>,
    next_seq: Arc<AtomicU64>,
}

impl InMemoryCollection {
    /// Creates an empty collection validated by `schema`.
    pub fn new(name: &str, schema: Schema) -> Self {
        Self {
            name: Arc::from(name),
            schema: Arc::new(schema),
            documents: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Canonical key for `id`: the lowercase hyphenated UUID form.
    fn parse_id(id: &RecordId) -> StoreResult<RecordId> {
        Uuid::parse_str(id.as_str())
            .map(|uuid| RecordId::new(uuid.hyphenated().to_string()))
            .map_err(|_| StoreError::MalformedId(id.to_string()))
    }
}

#[async_trait]
impl CollectionHandle for InMemoryCollection {
    type Document = StoredDocument;

    async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<StoredDocument>> {
        let key = Self::parse_id(id)?;
        let documents = self.documents.read().await;
        Ok(documents.get(&key).map(|slot| StoredDocument {
            id: key.clone(),
            fields: slot.fields.clone(),
        }))
    }

    async fn find_all(&self) -> StoreResult<Vec<StoredDocument>> {
        let documents = self.documents.read().await;
        let mut slots: Vec<(&RecordId, &Slot)> = documents.iter().collect();
        slots.sort_by_key(|(_, slot)| slot.seq);
        Ok(slots
            .into_iter()
            .map(|(id, slot)| StoredDocument {
                id: id.clone(),
                fields: slot.fields.clone(),
            })
            .collect())
    }

    async fn insert(&self, data: Fields) -> StoreResult<StoredDocument> {
        let fields = self
            .schema
            .validate_document(&data)
            .map_err(StoreError::Validation)?;
        let id = RecordId::new(Uuid::new_v4().to_string());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        let mut documents = self.documents.write().await;
        documents.insert(
            id.clone(),
            Slot {
                seq,
                fields: fields.clone(),
            },
        );
        tracing::trace!(collection = %self.name, record_id = %id, "Document inserted");
        Ok(StoredDocument { id, fields })
    }

    async fn update_by_id(&self, id: &RecordId, data: Fields) -> StoreResult<()> {
        let key = Self::parse_id(id)?;
        let patch = self
            .schema
            .validate_patch(&data)
            .map_err(StoreError::Validation)?;

        let mut documents = self.documents.write().await;
        let slot = documents
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        for (field, value) in patch {
            if value.is_null() {
                slot.fields.remove(&field);
            } else {
                slot.fields.insert(field, value);
            }
        }
        tracing::trace!(collection = %self.name, record_id = %id, "Document updated");
        Ok(())
    }

    async fn replace_by_id(&self, id: &RecordId, data: Fields) -> StoreResult<()> {
        let key = Self::parse_id(id)?;
        let fields = self
            .schema
            .validate_document(&data)
            .map_err(StoreError::Validation)?;

        let mut documents = self.documents.write().await;
        let slot = documents
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        slot.fields = fields;
        tracing::trace!(collection = %self.name, record_id = %id, "Document replaced");
        Ok(())
    }

    async fn remove_instance(&self, document: &StoredDocument) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        if documents.remove(&document.id).is_none() {
            return Err(StoreError::NotFound(document.id.clone()));
        }
        tracing::trace!(collection = %self.name, record_id = %document.id, "Document removed");
        Ok(())
    }
}

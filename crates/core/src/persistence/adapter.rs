//! The persistence adapter.
//!
//! Wraps a [`CollectionHandle`] with lookup/create/update/replace/delete and
//! reshapes every collection failure into a [`NormalizedError`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::record::{Fields, Record, RecordId};
use crate::storage::{CollectionHandle, Document, StoreError, ValidationErrors};

use super::{AdapterConfig, BuildError, NormalizedError, Result, StoreFailurePolicy};

/// Result of [`PersistenceAdapter::lookup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    One(Record),
    All(Vec<Record>),
}

impl Listing {
    pub fn into_one(self) -> Option<Record> {
        match self {
            Listing::One(record) => Some(record),
            Listing::All(_) => None,
        }
    }

    pub fn into_all(self) -> Option<Vec<Record>> {
        match self {
            Listing::All(records) => Some(records),
            Listing::One(_) => None,
        }
    }
}

/// How a failed write reports field errors.
#[derive(Debug, Clone, Copy)]
enum FieldReport {
    /// Every failing field (create).
    All,
    /// Only the primary failing field (update, replace).
    Primary,
}

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Merge,
    Replace,
}

/// CRUD adapter over a shared collection handle.
///
/// The adapter holds no state besides the handle and its configuration;
/// any number of adapters may share one handle.
pub struct PersistenceAdapter<H: CollectionHandle> {
    collection: Arc<H>,
    config: AdapterConfig,
}

impl<H: CollectionHandle> Clone for PersistenceAdapter<H> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            config: self.config,
        }
    }
}

impl<H: CollectionHandle> PersistenceAdapter<H> {
    /// Creates an adapter with the default configuration.
    pub fn new(collection: Arc<H>) -> Self {
        Self {
            collection,
            config: AdapterConfig::default(),
        }
    }

    pub fn builder() -> AdapterBuilder<H> {
        AdapterBuilder::default()
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn collection(&self) -> &Arc<H> {
        &self.collection
    }

    /// Fetches one record when `id` is given, otherwise the whole collection.
    pub async fn lookup(&self, id: Option<&RecordId>) -> Result<Listing> {
        match id {
            Some(id) => self.find(id).await.map(Listing::One),
            None => self.list_all().await.map(Listing::All),
        }
    }

    /// Fetches a single record as plain data.
    pub async fn find(&self, id: &RecordId) -> Result<Record> {
        self.find_live(id).await.map(|document| document.to_record())
    }

    /// Fetches the collection's live document for `id`.
    pub async fn find_live(&self, id: &RecordId) -> Result<H::Document> {
        match self.collection.find_by_id(id).await {
            Ok(Some(document)) => {
                tracing::trace!(record_id = %id, "Record found");
                Ok(document)
            }
            Ok(None) => {
                tracing::trace!(record_id = %id, "Record not found");
                Err(NormalizedError::not_found())
            }
            Err(err) => Err(self.read_failure(id.as_str(), err)),
        }
    }

    /// Returns every record in the collection, unfiltered.
    pub async fn list_all(&self) -> Result<Vec<Record>> {
        let documents = self
            .collection
            .find_all()
            .await
            .map_err(|err| self.read_failure("*", err))?;
        Ok(documents.iter().map(Document::to_record).collect())
    }

    /// Creates a record and returns its new id.
    pub async fn create(&self, data: Fields) -> Result<RecordId> {
        let document = self
            .collection
            .insert(data)
            .await
            .map_err(|err| self.write_failure("<new>", err, FieldReport::All))?;
        let id = document.id().clone();
        tracing::debug!(record_id = %id, "Record created");
        Ok(id)
    }

    /// Merges `data` into the record and returns the record as it was before.
    pub async fn update(&self, id: &RecordId, data: Fields) -> Result<Record> {
        self.overwrite(id, data, WriteMode::Merge).await
    }

    /// Replaces the record's content and returns the record as it was before.
    pub async fn replace(&self, id: &RecordId, data: Fields) -> Result<Record> {
        self.overwrite(id, data, WriteMode::Replace).await
    }

    /// Removes the record and returns its last state.
    pub async fn delete(&self, id: &RecordId) -> Result<Record> {
        let document = self.find_live(id).await?;
        self.collection
            .remove_instance(&document)
            .await
            .map_err(|err| self.read_failure(id.as_str(), err))?;
        tracing::debug!(record_id = %id, "Record deleted");
        Ok(document.to_record())
    }

    /// Reshapes field failures into a `{field: message}` map.
    pub fn format(errors: &ValidationErrors) -> BTreeMap<String, String> {
        errors.to_field_map()
    }

    // Lookup-then-write: a concurrent writer may land between the two calls.
    async fn overwrite(&self, id: &RecordId, data: Fields, mode: WriteMode) -> Result<Record> {
        let previous = self.find(id).await?;
        let outcome = match mode {
            WriteMode::Merge => self.collection.update_by_id(id, data).await,
            WriteMode::Replace => self.collection.replace_by_id(id, data).await,
        };
        outcome.map_err(|err| self.write_failure(id.as_str(), err, FieldReport::Primary))?;
        tracing::debug!(record_id = %id, ?mode, "Record written");
        Ok(previous)
    }

    fn read_failure(&self, target: &str, err: StoreError) -> NormalizedError {
        let normalized = match &err {
            StoreError::Unavailable(_) => self.backend_failure(NormalizedError::not_found()),
            StoreError::MalformedId(_) | StoreError::NotFound(_) | StoreError::Validation(_) => {
                NormalizedError::not_found()
            }
        };
        tracing::warn!(target_id = %target, error = %err, status = normalized.status, "Read failed");
        normalized
    }

    fn write_failure(&self, target: &str, err: StoreError, report: FieldReport) -> NormalizedError {
        let normalized = match &err {
            StoreError::Validation(errors) => {
                let data = match report {
                    FieldReport::All => Self::format(errors),
                    FieldReport::Primary => errors
                        .primary()
                        .map(|e| BTreeMap::from([(e.path.clone(), e.message.clone())]))
                        .unwrap_or_default(),
                };
                NormalizedError::invalid_input(data)
            }
            StoreError::MalformedId(_) | StoreError::NotFound(_) => NormalizedError::not_found(),
            StoreError::Unavailable(_) => {
                self.backend_failure(NormalizedError::invalid_input(BTreeMap::new()))
            }
        };
        tracing::warn!(target_id = %target, error = %err, status = normalized.status, "Write failed");
        normalized
    }

    /// Applies the store failure policy. `assumed` is what the call path
    /// reports under [`StoreFailurePolicy::Legacy`].
    fn backend_failure(&self, assumed: NormalizedError) -> NormalizedError {
        match self.config.store_failure {
            StoreFailurePolicy::Distinct => NormalizedError::server_error(),
            StoreFailurePolicy::Legacy => assumed,
        }
    }
}

/// Builder for [`PersistenceAdapter`] that rejects a missing collection.
pub struct AdapterBuilder<H: CollectionHandle> {
    collection: Option<Arc<H>>,
    config: AdapterConfig,
}

impl<H: CollectionHandle> Default for AdapterBuilder<H> {
    fn default() -> Self {
        Self {
            collection: None,
            config: AdapterConfig::default(),
        }
    }
}

impl<H: CollectionHandle> AdapterBuilder<H> {
    pub fn collection(mut self, collection: Arc<H>) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Sets or clears the collection from an optional handle.
    pub fn maybe_collection(mut self, collection: Option<Arc<H>>) -> Self {
        self.collection = collection;
        self
    }

    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> std::result::Result<PersistenceAdapter<H>, BuildError> {
        let collection = self.collection.ok_or(BuildError::MissingCollection)?;
        Ok(PersistenceAdapter::new(collection).with_config(self.config))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::persistence::ErrorKind;
    use crate::storage::{FieldError, StoreResult};

    #[derive(Debug, Clone)]
    struct TestDocument {
        id: RecordId,
        fields: Fields,
    }

    impl Document for TestDocument {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn to_record(&self) -> Record {
            Record::new(&self.id, self.fields.clone())
        }
    }

    /// Collection holding at most one document, with scripted failures.
    #[derive(Default)]
    struct ScriptedCollection {
        document: Mutex<Option<TestDocument>>,
        read_error: Option<StoreError>,
        write_error: Option<StoreError>,
    }

    impl ScriptedCollection {
        fn holding(id: &str, fields: Value) -> Self {
            let Value::Object(fields) = fields else {
                panic!("fixture must be an object");
            };
            Self {
                document: Mutex::new(Some(TestDocument {
                    id: RecordId::new(id),
                    fields,
                })),
                ..Default::default()
            }
        }

        fn current(&self) -> Option<TestDocument> {
            self.document.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CollectionHandle for ScriptedCollection {
        type Document = TestDocument;

        async fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<TestDocument>> {
            if let Some(err) = &self.read_error {
                return Err(err.clone());
            }
            Ok(self.current().filter(|d| &d.id == id))
        }

        async fn find_all(&self) -> StoreResult<Vec<TestDocument>> {
            if let Some(err) = &self.read_error {
                return Err(err.clone());
            }
            Ok(self.current().into_iter().collect())
        }

        async fn insert(&self, data: Fields) -> StoreResult<TestDocument> {
            if let Some(err) = &self.write_error {
                return Err(err.clone());
            }
            let document = TestDocument {
                id: RecordId::new("new-id"),
                fields: data,
            };
            *self.document.lock().unwrap() = Some(document.clone());
            Ok(document)
        }

        async fn update_by_id(&self, _id: &RecordId, data: Fields) -> StoreResult<()> {
            if let Some(err) = &self.write_error {
                return Err(err.clone());
            }
            if let Some(document) = self.document.lock().unwrap().as_mut() {
                document.fields.extend(data);
            }
            Ok(())
        }

        async fn replace_by_id(&self, _id: &RecordId, data: Fields) -> StoreResult<()> {
            if let Some(err) = &self.write_error {
                return Err(err.clone());
            }
            if let Some(document) = self.document.lock().unwrap().as_mut() {
                document.fields = data;
            }
            Ok(())
        }

        async fn remove_instance(&self, _document: &TestDocument) -> StoreResult<()> {
            if let Some(err) = &self.write_error {
                return Err(err.clone());
            }
            *self.document.lock().unwrap() = None;
            Ok(())
        }
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn two_field_errors() -> StoreError {
        StoreError::Validation(
            vec![
                FieldError::new("value", "bad value"),
                FieldError::new("title", "missing title"),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_builder_requires_collection() {
        let result = PersistenceAdapter::<ScriptedCollection>::builder().build();
        assert!(matches!(result, Err(BuildError::MissingCollection)));

        let result = PersistenceAdapter::<ScriptedCollection>::builder()
            .maybe_collection(None)
            .build();
        assert!(matches!(result, Err(BuildError::MissingCollection)));
    }

    #[test]
    fn test_builder_applies_config() {
        let config = AdapterConfig {
            store_failure: StoreFailurePolicy::Legacy,
        };
        let adapter = PersistenceAdapter::builder()
            .collection(Arc::new(ScriptedCollection::default()))
            .config(config)
            .build()
            .unwrap();

        assert_eq!(adapter.config(), &config);
    }

    #[test]
    fn test_format_maps_every_field() {
        let StoreError::Validation(errors) = two_field_errors() else {
            unreachable!();
        };
        let map = PersistenceAdapter::<ScriptedCollection>::format(&errors);

        assert_eq!(
            map,
            BTreeMap::from([
                ("title".to_string(), "missing title".to_string()),
                ("value".to_string(), "bad value".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_lookup_missing_is_not_found() {
        let adapter = PersistenceAdapter::new(Arc::new(ScriptedCollection::default()));

        let err = adapter
            .lookup(Some(&RecordId::new("nope")))
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Resource not found");
        assert!(err.data.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_without_id_lists_all() {
        let collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let records = adapter.lookup(None).await.unwrap().into_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("title"), Some(&json!("foo")));
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let collection = ScriptedCollection {
            read_error: Some(StoreError::MalformedId("asd".to_string())),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter.find(&RecordId::new("asd")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unavailable_read_distinct_policy() {
        let collection = ScriptedCollection {
            read_error: Some(StoreError::Unavailable("down".to_string())),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter.find(&RecordId::new("a")).await.unwrap_err();
        assert_eq!(err.status, 500);

        let err = adapter.list_all().await.unwrap_err();
        assert_eq!(err.status, 500);
    }

    #[tokio::test]
    async fn test_unavailable_read_legacy_policy() {
        let collection = ScriptedCollection {
            read_error: Some(StoreError::Unavailable("down".to_string())),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection)).with_config(AdapterConfig {
            store_failure: StoreFailurePolicy::Legacy,
        });

        let err = adapter.find(&RecordId::new("a")).await.unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_unavailable_write_legacy_policy_is_invalid_input() {
        let collection = ScriptedCollection {
            write_error: Some(StoreError::Unavailable("down".to_string())),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection)).with_config(AdapterConfig {
            store_failure: StoreFailurePolicy::Legacy,
        });

        let err = adapter
            .create(fields(json!({"title": "foo"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.data.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_write_distinct_policy_is_server_error() {
        let mut collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        collection.write_error = Some(StoreError::Unavailable("down".to_string()));
        let adapter = PersistenceAdapter::new(Arc::new(collection));
        let id = RecordId::new("a");

        let err = adapter
            .create(fields(json!({"title": "foo"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Storage failure");
        assert!(err.data.is_empty());

        let err = adapter
            .update(&id, fields(json!({"value": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
        assert!(err.data.is_empty());

        let err = adapter
            .replace(&id, fields(json!({"title": "bar"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
        assert!(err.data.is_empty());
    }

    #[tokio::test]
    async fn test_delete_remove_failure_classified_as_read() {
        let mut collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        collection.write_error = Some(StoreError::Unavailable("down".to_string()));
        let collection = Arc::new(collection);
        let id = RecordId::new("a");

        let distinct = PersistenceAdapter::new(Arc::clone(&collection));
        let err = distinct.delete(&id).await.unwrap_err();
        assert_eq!(err.status, 500);

        let legacy = distinct.clone().with_config(AdapterConfig {
            store_failure: StoreFailurePolicy::Legacy,
        });
        let err = legacy.delete(&id).await.unwrap_err();
        assert_eq!(err.status, 404);
        assert!(err.data.is_empty());

        // The document survives a failed removal.
        assert!(collection.current().is_some());
    }

    #[tokio::test]
    async fn test_unavailable_list_legacy_policy_is_not_found() {
        let collection = ScriptedCollection {
            read_error: Some(StoreError::Unavailable("down".to_string())),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection)).with_config(AdapterConfig {
            store_failure: StoreFailurePolicy::Legacy,
        });

        let err = adapter.list_all().await.unwrap_err();
        assert_eq!(err.status, 404);

        let err = adapter.lookup(None).await.unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_create_reports_every_field() {
        let collection = ScriptedCollection {
            write_error: Some(two_field_errors()),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter.create(Fields::new()).await.unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "Invalid data");
        assert_eq!(err.data.len(), 2);
    }

    #[tokio::test]
    async fn test_update_reports_primary_field_only() {
        let mut collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        collection.write_error = Some(two_field_errors());
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter
            .update(&RecordId::new("a"), fields(json!({"value": "x"})))
            .await
            .unwrap_err();
        assert_eq!(
            err.data,
            BTreeMap::from([("value".to_string(), "bad value".to_string())])
        );

        let err = adapter
            .replace(&RecordId::new("a"), fields(json!({"value": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.data.len(), 1);
        assert!(err.data.contains_key("value"));
    }

    #[tokio::test]
    async fn test_update_missing_skips_write() {
        let collection = ScriptedCollection {
            write_error: Some(two_field_errors()),
            ..Default::default()
        };
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter
            .update(&RecordId::new("ghost"), fields(json!({"value": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_update_returns_previous_state() {
        let collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let old = adapter
            .update(&RecordId::new("a"), fields(json!({"value": 1})))
            .await
            .unwrap();
        assert!(old.is_falsy("value"));

        let now = adapter.find(&RecordId::new("a")).await.unwrap();
        assert_eq!(now.get("value"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_write_race_with_vanished_record_is_not_found() {
        let mut collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        collection.write_error = Some(StoreError::NotFound(RecordId::new("a")));
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let err = adapter
            .replace(&RecordId::new("a"), fields(json!({"title": "bar"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let collection = ScriptedCollection::holding("a", json!({"title": "foo"}));
        let adapter = PersistenceAdapter::new(Arc::new(collection));

        let removed = adapter.delete(&RecordId::new("a")).await.unwrap();
        assert_eq!(removed.id(), Some(RecordId::new("a")));

        let err = adapter.find(&RecordId::new("a")).await.unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_adapters_share_one_collection() {
        let collection = Arc::new(ScriptedCollection::default());
        let writer = PersistenceAdapter::new(Arc::clone(&collection));
        let reader = writer.clone();

        let id = writer.create(fields(json!({"title": "foo"}))).await.unwrap();
        let record = reader.find(&id).await.unwrap();
        assert_eq!(record.get("title"), Some(&json!("foo")));
    }
}

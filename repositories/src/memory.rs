use error_stack::{IntoReport, ResultExt};
use locimo_core::result::{StoreError, StoreResult};
use locimo_core::store::{Document, DocumentId, DocumentStore, StoredDocument};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

type Collection = BTreeMap<DocumentId, Document>;

/// A document store held in process memory.
///
/// Identifiers are time ordered (UUIDv7), so listings come back in insertion order. Failures
/// and latency can be injected per collection to exercise callers' error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<&'static str, Collection>>>,
    failures: Arc<Mutex<HashMap<&'static str, StoreError>>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation waits `latency` before touching the data.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every following operation on `collection` fail with `error`.
    pub fn fail_collection(&self, collection: &'static str, error: StoreError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(collection, error);
        }
    }

    pub fn heal_collection(&self, collection: &'static str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(collection);
        }
    }

    /// Put a raw document in place, bypassing any record checks. Handy for seeding data
    /// that did not come through the access layer.
    pub async fn seed(&self, collection: &'static str, id: DocumentId, data: Document) {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id, data);
    }

    async fn enter(&self, collection: &'static str) -> StoreResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let injected = self
            .failures
            .lock()
            .map(|failures| failures.get(collection).copied())
            .unwrap_or(Some(StoreError::Unavailable));

        match injected {
            Some(error) => Err(error.into_report())
                .attach_with(|| format!("injected failure for '{collection}'")),
            None => Ok(()),
        }
    }
}

impl DocumentStore for MemoryStore {
    #[instrument(skip(self, data))]
    async fn insert(&self, collection: &'static str, data: Document) -> StoreResult<DocumentId> {
        self.enter(collection).await?;

        let id = DocumentId::new(Uuid::now_v7().to_string());
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);

        debug!("inserted {id}");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_all(&self, collection: &'static str) -> StoreResult<Vec<StoredDocument>> {
        self.enter(collection).await?;

        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, value))]
    async fn get_where(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> StoreResult<Vec<StoredDocument>> {
        self.enter(collection).await?;

        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| data.get(field) == Some(&value))
                    .map(|(id, data)| StoredDocument::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, partial))]
    async fn update_fields(
        &self,
        collection: &'static str,
        id: &DocumentId,
        partial: Document,
    ) -> StoreResult<()> {
        self.enter(collection).await?;

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)
            .attach_with(|| format!("no document {id} in '{collection}'"))?;

        document.extend(partial);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, collection: &'static str, id: &DocumentId) -> StoreResult<bool> {
        self.enter(collection).await?;

        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}

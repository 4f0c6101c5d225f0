use crate::clock::{SharedClock, format_timestamp, system_clock};
use crate::model::{Alert, Key, Property, Record, Resource, StampedBody, Supplier, Validate};
use crate::result::{OptStoreResult, StoreError, StoreResult};
use crate::store::{DocumentId, DocumentStore, StoredDocument, to_document};
use error_stack::ResultExt;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use tracing::{debug, instrument, warn};

const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// Typed CRUD over the collection of one [`Resource`] kind.
pub struct ResourceRepository<R, S> {
    store: S,
    clock: SharedClock,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S: Clone> Clone for ResourceRepository<R, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource, S> Debug for ResourceRepository<R, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRepository")
            .field("collection", &R::COLLECTION)
            .finish_non_exhaustive()
    }
}

impl<R, S> ResourceRepository<R, S>
where
    R: Resource,
    S: DocumentStore,
{
    pub fn new(store: S, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            _resource: PhantomData,
        }
    }

    /// Every record of the collection, in whatever order the store returns them.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&self) -> StoreResult<Vec<Record<R>>> {
        let documents = self
            .store
            .get_all(R::COLLECTION)
            .await
            .attach_with(|| format!("listing '{}'", R::COLLECTION))?;

        Ok(decode_all(documents))
    }

    /// Records whose `field` is equal to `value`.
    #[instrument(skip(self, value), fields(collection = R::COLLECTION))]
    pub async fn list_by_field(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> StoreResult<Vec<Record<R>>> {
        let documents = self
            .store
            .get_where(R::COLLECTION, field, value.into())
            .await
            .attach_with(|| format!("listing '{}' by '{field}'", R::COLLECTION))?;

        Ok(decode_all(documents))
    }

    /// Insert `data`, stamping both timestamps, and return the new identifier.
    /// Blank required fields are refused with [`StoreError::InvalidRecord`].
    #[instrument(skip_all, fields(collection = R::COLLECTION))]
    pub async fn create(&self, data: R) -> StoreResult<DocumentId> {
        reject_blank(&data)?;
        let mut document = to_document(&data)?;
        let now = Value::String(format_timestamp(self.clock.now()));
        document.insert(CREATED_AT.to_string(), now.clone());
        document.insert(UPDATED_AT.to_string(), now);

        let id = self
            .store
            .insert(R::COLLECTION, document)
            .await
            .attach_with(|| format!("creating a record in '{}'", R::COLLECTION))?;

        debug!("created {id}");
        Ok(id)
    }

    /// Merge the fields present in `patch` into the record and refresh `updated_at`,
    /// even if `patch` carries nothing else.
    #[instrument(skip(self, patch), fields(collection = R::COLLECTION))]
    pub async fn update(&self, id: &DocumentId, patch: R::Patch) -> StoreResult<()> {
        reject_blank(&patch)?;
        let mut partial = to_document(&patch)?;
        if partial.is_empty() {
            debug!("empty patch, only refreshing {UPDATED_AT}");
        }
        partial.insert(
            UPDATED_AT.to_string(),
            Value::String(format_timestamp(self.clock.now())),
        );

        self.store
            .update_fields(R::COLLECTION, id, partial)
            .await
            .attach_with(|| format!("updating {id} in '{}'", R::COLLECTION))
    }

    /// Delete by identifier. Removing a record that is already gone is not an error,
    /// it is reported as `None`.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn remove(&self, id: &DocumentId) -> OptStoreResult<()> {
        let removed = self
            .store
            .delete_by_id(R::COLLECTION, id)
            .await
            .attach_with(|| format!("removing {id} from '{}'", R::COLLECTION))?;

        if !removed {
            debug!("{id} did not exist, nothing removed");
        }
        Ok(removed.then_some(()))
    }
}

impl<S: DocumentStore> ResourceRepository<Alert, S> {
    /// Alerts raised against the given key.
    pub async fn list_for_key(&self, key_id: &DocumentId) -> StoreResult<Vec<Record<Alert>>> {
        self.list_by_field("key_id", key_id).await
    }
}

fn reject_blank(body: &impl Validate) -> StoreResult<()> {
    let blank = body.blank_fields();
    if blank.is_empty() {
        return Ok(());
    }
    Err(error_stack::Report::new(StoreError::InvalidRecord)
        .attach(format!("required fields are blank: {}", blank.join(", "))))
}

fn decode_all<R: Resource>(documents: Vec<StoredDocument>) -> Vec<Record<R>> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            decode(doc)
                .inspect_err(|e| warn!("skipping {id} from '{}': {e:?}", R::COLLECTION))
                .ok()
        })
        .collect()
}

/// Check a stored document against the record shape of `R`.
pub fn decode<R: Resource>(document: StoredDocument) -> StoreResult<Record<R>> {
    let StoredDocument { id, data } = document;
    if id.is_empty() {
        return Err(error_stack::Report::new(StoreError::InvalidRecord)
            .attach("document has an empty identifier"));
    }

    serde_json::from_value::<StampedBody<R>>(Value::Object(data))
        .change_context(StoreError::InvalidRecord)
        .map(|body| Record::from_body(id, body))
}

/// The access modules of every resource kind, sharing one store handle and one clock.
#[derive(Clone)]
pub struct Resources<S> {
    store: S,
    clock: SharedClock,
}

impl<S: Debug> Debug for Resources<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("store", &self.store)
            .field("clock", &self.clock)
            .finish()
    }
}

impl<S: DocumentStore> Resources<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_clock())
    }

    pub fn with_clock(store: S, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub fn repository<R: Resource>(&self) -> ResourceRepository<R, S> {
        ResourceRepository::new(self.store.clone(), self.clock.clone())
    }

    pub fn alerts(&self) -> ResourceRepository<Alert, S> {
        self.repository()
    }

    pub fn keys(&self) -> ResourceRepository<Key, S> {
        self.repository()
    }

    pub fn properties(&self) -> ResourceRepository<Property, S> {
        self.repository()
    }

    pub fn suppliers(&self) -> ResourceRepository<Supplier, S> {
        self.repository()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertStatus;
    use serde_json::json;

    fn stored(id: &str, value: Value) -> StoredDocument {
        let Value::Object(data) = value else {
            panic!("test documents are objects")
        };
        StoredDocument::new(DocumentId::new(id), data)
    }

    #[test]
    fn decode_keeps_id_and_timestamps() {
        let record = decode::<Alert>(stored(
            "a1",
            json!({
                "key_id": "k1",
                "alert_date": "2024-03-05",
                "description": "Récupérer les clés",
                "status": "Pending",
                "created_at": "2024-03-01T09:00:00.000Z",
                "updated_at": "2024-03-01T09:00:00.000Z",
            }),
        ))
        .unwrap();

        assert_eq!(DocumentId::new("a1"), record.id);
        assert_eq!(Some(DocumentId::new("k1")), record.data.key_id);
        assert_eq!(AlertStatus::Pending, record.data.status);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn decode_rejects_unknown_status() {
        let result = decode::<Alert>(stored(
            "a1",
            json!({
                "alert_date": "2024-03-05",
                "description": "x",
                "status": "Snoozed",
            }),
        ));

        let err = result.unwrap_err();
        assert_eq!(&StoreError::InvalidRecord, err.current_context());
    }

    #[test]
    fn malformed_documents_are_skipped_from_listings() {
        let records = decode_all::<Key>(vec![
            stored("k1", json!({ "date": "2024-03-05", "description": "Villa Rose" })),
            stored("k2", json!({ "description": "no date" })),
            stored("k3", json!({ "date": "2024-03-07", "description": "Studio" })),
        ]);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(vec!["k1", "k3"], ids);
    }

    #[test]
    fn fractional_local_dates_stay_listed() {
        let records = decode_all::<Key>(vec![
            stored("k1", json!({ "date": "2024-03-05T12:00:00.500", "description": "Villa Rose" })),
            stored("k2", json!({ "date": "2024-03-05T09:30:00.000Z", "description": "Studio" })),
        ]);

        let dates: Vec<_> = records.iter().map(|r| r.data.date.as_str()).collect();
        assert_eq!(vec!["2024-03-05T12:00:00.500", "2024-03-05T09:30:00.000Z"], dates);
    }

    #[test]
    fn blank_fields_are_refused_before_writing() {
        let err = reject_blank(&Key {
            date: "2024-03-05".parse().unwrap(),
            description: " ".into(),
            property_id: None,
        })
        .unwrap_err();

        assert_eq!(&StoreError::InvalidRecord, err.current_context());
    }
}

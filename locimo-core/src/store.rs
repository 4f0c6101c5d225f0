use crate::result::{StoreError, StoreResult};
use error_stack::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use utoipa::ToSchema;

/// The body of a schemaless document, without its identifier.
pub type Document = serde_json::Map<String, Value>;

/// Opaque, store-assigned identifier. Unique within a collection only.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
#[repr(transparent)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DocumentId> for Value {
    fn from(value: DocumentId) -> Self {
        Value::String(value.0)
    }
}

impl From<&DocumentId> for Value {
    fn from(value: &DocumentId) -> Self {
        Value::String(value.0.clone())
    }
}

/// A document as the store hands it back: its identifier plus its body.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub data: Document,
}

impl StoredDocument {
    pub fn new(id: DocumentId, data: Document) -> Self {
        Self { id, data }
    }
}

/// Capability set of the remote document database.
///
/// Every call is a single remote operation. Implementations report failures with
/// [`StoreError`] and never retry.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Insert `data` as a new document and return the identifier the store assigned.
    fn insert(
        &self,
        collection: &'static str,
        data: Document,
    ) -> impl Future<Output = StoreResult<DocumentId>> + Send;

    fn get_all(
        &self,
        collection: &'static str,
    ) -> impl Future<Output = StoreResult<Vec<StoredDocument>>> + Send;

    /// Documents whose `field` equals `value`. Documents missing the field never match.
    fn get_where(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> impl Future<Output = StoreResult<Vec<StoredDocument>>> + Send;

    /// Merge `partial` into the document. Fails with [`StoreError::NotFound`] if `id` does not exist.
    fn update_fields(
        &self,
        collection: &'static str,
        id: &DocumentId,
        partial: Document,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Returns whether a document was actually removed.
    fn delete_by_id(
        &self,
        collection: &'static str,
        id: &DocumentId,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

impl<T> DocumentStore for Arc<T>
where
    T: DocumentStore,
{
    async fn insert(&self, collection: &'static str, data: Document) -> StoreResult<DocumentId> {
        (**self).insert(collection, data).await
    }

    async fn get_all(&self, collection: &'static str) -> StoreResult<Vec<StoredDocument>> {
        (**self).get_all(collection).await
    }

    async fn get_where(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> StoreResult<Vec<StoredDocument>> {
        (**self).get_where(collection, field, value).await
    }

    async fn update_fields(
        &self,
        collection: &'static str,
        id: &DocumentId,
        partial: Document,
    ) -> StoreResult<()> {
        (**self).update_fields(collection, id, partial).await
    }

    async fn delete_by_id(&self, collection: &'static str, id: &DocumentId) -> StoreResult<bool> {
        (**self).delete_by_id(collection, id).await
    }
}

/// Turn a serializable value into a document body. Anything that is not a JSON object is rejected.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Report::new(StoreError::InvalidRecord)
            .attach(format!("expected an object, got {other}"))),
        Err(e) => Err(Report::new(e).change_context(StoreError::InvalidRecord)),
    }
}

use crate::{RepoInitErr, RepoInitResult};
use bson::oid::ObjectId;
use bson::{Bson, doc};
use error_stack::{IntoReport, Report, ResultExt};
use locimo_core::result::{StoreError, StoreResult};
use locimo_core::store::{Document, DocumentId, DocumentStore, StoredDocument};
use mongodb::error::ErrorKind;
use mongodb::options::FindOptions;
use mongodb::{Client, Database};
use serde_json::Value;
use tokio_stream::StreamExt;
use tracing::{debug, instrument, warn};

/// Server error code MongoDB uses for `Unauthorized`.
const UNAUTHORIZED: i32 = 13;
const ID_FIELD: &str = "_id";

pub enum ConnectionDetails {
    Url(String),
}

/// [`DocumentStore`] backed by a MongoDB database. Identifiers are the hex form of the
/// documents' `ObjectId`s.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db_name: &str) -> Self {
        Self {
            db: client.database(db_name),
        }
    }

    pub async fn init(
        connection_details: ConnectionDetails,
        db_name: &str,
    ) -> RepoInitResult<MongoStore> {
        let client = match connection_details {
            ConnectionDetails::Url(url) => Client::with_uri_str(url)
                .await
                .change_context(RepoInitErr)
                .attach("failed to create client connection to mongodb instance")?,
        };

        Ok(Self::new(client, db_name))
    }

    fn collection(&self, name: &'static str) -> mongodb::Collection<bson::Document> {
        self.db.collection(name)
    }

    async fn find(
        &self,
        collection: &'static str,
        filter: bson::Document,
    ) -> StoreResult<Vec<StoredDocument>> {
        let options = FindOptions::builder().sort(doc! { ID_FIELD: 1 }).build();

        self.collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .into_store()?
            .map(|d| d.map(from_bson))
            .collect::<Result<Vec<_>, _>>()
            .await
            .into_store()
    }
}

/// Classifies driver errors into the store taxonomy.
trait IntoStoreResult<T> {
    fn into_store(self) -> StoreResult<T>;
}

impl<T> IntoStoreResult<T> for Result<T, mongodb::error::Error> {
    fn into_store(self) -> StoreResult<T> {
        self.map_err(|e| {
            let context = classify(&e);
            Report::new(e).change_context(context)
        })
    }
}

fn classify(error: &mongodb::error::Error) -> StoreError {
    match &*error.kind {
        ErrorKind::Command(command) if command.code == UNAUTHORIZED => {
            StoreError::PermissionDenied
        }
        ErrorKind::Authentication { .. } => StoreError::PermissionDenied,
        _ => StoreError::Unavailable,
    }
}

fn object_id(id: &DocumentId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

fn to_bson(data: &Document) -> StoreResult<bson::Document> {
    bson::to_document(data)
        .change_context(StoreError::InvalidRecord)
        .attach("document body could not be converted to bson")
}

/// The stored `_id` becomes the identifier, anything that is not an `ObjectId` is left
/// empty so record decoding rejects it.
fn from_bson(mut document: bson::Document) -> StoredDocument {
    let id = match document.remove(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => DocumentId::new(oid.to_hex()),
        other => {
            warn!("document with unexpected id {other:?}");
            DocumentId::new("")
        }
    };

    let data = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Document::new(),
    };

    StoredDocument::new(id, data)
}

impl DocumentStore for MongoStore {
    #[instrument(skip(self, data))]
    async fn insert(&self, collection: &'static str, data: Document) -> StoreResult<DocumentId> {
        let document = to_bson(&data)?;

        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .into_store()?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::InvalidRecord)
            .attach_with(|| format!("inserted id {:?} was not an ObjectId", result.inserted_id))?;

        debug!("inserted {id}");
        Ok(DocumentId::new(id.to_hex()))
    }

    #[instrument(skip(self))]
    async fn get_all(&self, collection: &'static str) -> StoreResult<Vec<StoredDocument>> {
        self.find(collection, bson::Document::new()).await
    }

    #[instrument(skip(self, value))]
    async fn get_where(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> StoreResult<Vec<StoredDocument>> {
        let value = bson::to_bson(&value)
            .change_context(StoreError::InvalidRecord)
            .attach_with(|| format!("filter value for '{field}' could not be converted"))?;

        // `$exists` keeps documents without the field out of a `null` match
        let filter = doc! { field: { "$exists": true, "$eq": value } };
        self.find(collection, filter).await
    }

    #[instrument(skip(self, partial))]
    async fn update_fields(
        &self,
        collection: &'static str,
        id: &DocumentId,
        partial: Document,
    ) -> StoreResult<()> {
        let Some(oid) = object_id(id) else {
            return Err(StoreError::NotFound.into_report())
                .attach_with(|| format!("{id} is not a valid ObjectId"));
        };

        let matched = if partial.is_empty() {
            self.collection(collection)
                .count_documents(doc! { ID_FIELD: oid })
                .await
                .into_store()?
        } else {
            self.collection(collection)
                .update_one(doc! { ID_FIELD: oid }, doc! { "$set": to_bson(&partial)? })
                .await
                .into_store()?
                .matched_count
        };

        if matched == 0 {
            return Err(StoreError::NotFound.into_report())
                .attach_with(|| format!("no document {id} in '{collection}'"));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, collection: &'static str, id: &DocumentId) -> StoreResult<bool> {
        let Some(oid) = object_id(id) else {
            debug!("{id} is not a valid ObjectId, nothing to delete");
            return Ok(false);
        };

        let result = self
            .collection(collection)
            .delete_one(doc! { ID_FIELD: oid })
            .await
            .into_store()?;

        Ok(result.deleted_count > 0)
    }
}

use crate::store::DocumentId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{PartialSchema, ToSchema};

mod alert;
mod event_date;
mod key;
mod property;
mod supplier;

pub use alert::{Alert, AlertPatch, AlertStatus};
pub use event_date::EventDate;
pub use key::{Key, KeyPatch};
pub use property::{Property, PropertyPatch};
pub use supplier::{Supplier, SupplierPatch};

/// A kind of record kept in its own document collection.
///
/// The implementing type is the record body as a client writes it: no identifier and no
/// timestamps, those belong to [`Record`].
pub trait Resource:
    Validate + Debug + Clone + Serialize + DeserializeOwned + ToSchema + Send + Sync + 'static
{
    const COLLECTION: &'static str;
    /// Fields that may be used for equality listing from the outside.
    const FILTERABLE: &'static [&'static str] = &[];

    type Patch: Validate + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
}

/// A stored record: the store-assigned id, the body and the write-path timestamps.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Record<R> {
    pub id: DocumentId,
    #[serde(flatten)]
    pub data: R,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The stored shape of a record body, i.e. everything but the id.
#[derive(Debug, Deserialize)]
pub(crate) struct StampedBody<R> {
    #[serde(flatten)]
    pub data: R,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<R> Record<R> {
    pub(crate) fn from_body(id: DocumentId, body: StampedBody<R>) -> Self {
        Self {
            id,
            data: body.data,
            created_at: body.created_at,
            updated_at: body.updated_at,
        }
    }
}

pub fn patch_field_schema() -> impl Into<RefOr<Schema>> {
    <Option<String> as PartialSchema>::schema()
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Field-level validation done before anything is written.
pub trait Validate {
    /// Names of the required fields that are blank.
    fn blank_fields(&self) -> Vec<&'static str>;
}

macro_rules! required_text {
    ($self:ident, $($field:ident),+ $(,)?) => {{
        let mut blank = Vec::new();
        $(
            if $crate::model::is_blank(&$self.$field) {
                blank.push(stringify!($field));
            }
        )+
        blank
    }};
}
pub(crate) use required_text;

macro_rules! required_patch_text {
    ($self:ident, $($field:ident),+ $(,)?) => {{
        let mut blank = Vec::new();
        $(
            if $self.$field.as_deref().is_some_and($crate::model::is_blank) {
                blank.push(stringify!($field));
            }
        )+
        blank
    }};
}
pub(crate) use required_patch_text;

use super::{EventDate, Resource, Validate, required_patch_text, required_text};
use crate::store::DocumentId;
use optional_field::{Field, serde_optional_fields};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A physical key handed over or expected back on `date`.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Key {
    #[schema(value_type = String, example = "2024-03-05")]
    pub date: EventDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<DocumentId>,
}

impl Resource for Key {
    const COLLECTION: &'static str = "keys";
    const FILTERABLE: &'static [&'static str] = &["property_id"];

    type Patch = KeyPatch;
}

impl Validate for Key {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_text!(self, description)
    }
}

#[serde_optional_fields]
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KeyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub date: Option<EventDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub property_id: Field<DocumentId>,
}

impl Validate for KeyPatch {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_patch_text!(self, description)
    }
}

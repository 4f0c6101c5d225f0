use super::{Resource, Validate, required_patch_text, required_text};
use optional_field::{Field, serde_optional_fields};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for Property {
    const COLLECTION: &'static str = "properties";

    type Patch = PropertyPatch;
}

impl Validate for Property {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_text!(self, name, address)
    }
}

#[serde_optional_fields]
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub city: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub postal_code: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub notes: Field<String>,
}

impl Validate for PropertyPatch {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_patch_text!(self, name, address)
    }
}

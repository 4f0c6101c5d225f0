use super::{Resource, Validate, required_patch_text, required_text};
use optional_field::{Field, serde_optional_fields};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A contractor the company calls on (plumber, locksmith, cleaning...).
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Supplier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Resource for Supplier {
    const COLLECTION: &'static str = "suppliers";

    type Patch = SupplierPatch;
}

impl Validate for Supplier {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_text!(self, name)
    }
}

#[serde_optional_fields]
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SupplierPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub service: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub contact_name: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub phone: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub email: Field<String>,
    #[schema(schema_with = super::patch_field_schema)]
    pub notes: Field<String>,
}

impl Validate for SupplierPatch {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_patch_text!(self, name)
    }
}

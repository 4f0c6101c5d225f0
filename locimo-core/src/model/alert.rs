use super::{EventDate, Resource, Validate, required_patch_text, required_text};
use crate::store::DocumentId;
use optional_field::{Field, serde_optional_fields};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AlertStatus {
    Pending,
    Dismissed,
}

impl AlertStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, AlertStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "Pending",
            AlertStatus::Dismissed => "Dismissed",
        }
    }
}

impl Display for AlertStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Alert {
    /// The key this alert is about. Not checked against the key collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<DocumentId>,
    #[schema(value_type = String, example = "2024-03-05")]
    pub alert_date: EventDate,
    pub description: String,
    pub status: AlertStatus,
}

impl Resource for Alert {
    const COLLECTION: &'static str = "alerts";
    const FILTERABLE: &'static [&'static str] = &["key_id", "status"];

    type Patch = AlertPatch;
}

impl Validate for Alert {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_text!(self, description)
    }
}

#[serde_optional_fields]
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AlertPatch {
    /// Set to null to detach the alert from its key.
    #[schema(schema_with = super::patch_field_schema)]
    pub key_id: Field<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub alert_date: Option<EventDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
}

impl AlertPatch {
    pub fn status(status: AlertStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Validate for AlertPatch {
    fn blank_fields(&self) -> Vec<&'static str> {
        required_patch_text!(self, description)
    }
}

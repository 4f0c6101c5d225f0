use locimo_core::model::{
    Alert, AlertPatch, Key, KeyPatch, Property, PropertyPatch, Supplier, SupplierPatch,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Fields every stored record carries. The collection's own fields are listed alongside
/// these, at the same level.
#[derive(Debug, Serialize, ToSchema)]
#[allow(dead_code)]
pub struct RecordFields {
    pub id: String,
    #[schema(example = "2024-03-01T09:00:00.000Z")]
    pub created_at: Option<String>,
    #[schema(example = "2024-03-01T09:00:00.000Z")]
    pub updated_at: Option<String>,
}

/// Body of a create request; which shape applies depends on the collection in the path.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
#[allow(dead_code)]
pub enum RecordBody {
    Alert(Alert),
    Key(Key),
    Property(Property),
    Supplier(Supplier),
}

/// Body of a patch request. Absent fields are left alone, optional fields set to `null`
/// are cleared.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
#[allow(dead_code)]
pub enum PatchBody {
    Alert(AlertPatch),
    Key(KeyPatch),
    Property(PropertyPatch),
    Supplier(SupplierPatch),
}

#[derive(Debug, Serialize, ToSchema)]
#[allow(dead_code)]
pub struct CalendarDayFields {
    #[schema(example = "2024-03-05")]
    pub date: String,
    pub alerts: Vec<RecordFields>,
    pub keys: Vec<RecordFields>,
    pub has_alerts: bool,
    pub has_pending_alerts: bool,
    pub has_keys: bool,
    pub is_today: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[allow(dead_code)]
pub struct MonthViewFields {
    #[schema(example = "2024-03")]
    pub month: String,
    /// Empty cells before the 1st in a Monday-first grid.
    pub leading_blanks: u32,
    pub trailing_blanks: u32,
    pub days: Vec<CalendarDayFields>,
}

pub mod examples {
    use serde_json::{Value, json};
    use std::sync::LazyLock;

    static ALERT_LISTING: LazyLock<Value> = LazyLock::new(|| {
        json!([
            {
                "id": "0190f6a2-7c1e-7b3a-9d2e-1f4a5b6c7d8e",
                "key_id": "0190f6a1-1a2b-7c3d-8e4f-5a6b7c8d9e0f",
                "alert_date": "2024-03-05",
                "description": "Récupérer les clés de la Villa Rose",
                "status": "Pending",
                "created_at": "2024-03-01T09:00:00.000Z",
                "updated_at": "2024-03-01T09:00:00.000Z"
            }
        ])
    });

    pub fn alert_listing() -> &'static Value {
        &ALERT_LISTING
    }

    static CALENDAR_MONTH: LazyLock<Value> = LazyLock::new(|| {
        json!({
            "month": "2024-03",
            "leading_blanks": 4,
            "trailing_blanks": 0,
            "days": [
                {
                    "date": "2024-03-01",
                    "alerts": [],
                    "keys": [],
                    "has_alerts": false,
                    "has_pending_alerts": false,
                    "has_keys": false,
                    "is_today": false
                }
            ]
        })
    });

    pub fn calendar_month() -> &'static Value {
        &CALENDAR_MONTH
    }
}

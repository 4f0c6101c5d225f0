//! Behaviour every store must show through the access layer. Each check starts from an
//! empty store.

use locimo_core::model::{
    Alert, AlertPatch, AlertStatus, Key, Property, PropertyPatch, Record, Supplier,
};
use locimo_core::repository::Resources;
use locimo_core::result::StoreError;
use locimo_core::store::{DocumentId, DocumentStore};
use optional_field::Field;

fn property() -> Property {
    Property {
        name: "Villa Rose".into(),
        address: "12 avenue des Lilas".into(),
        city: Some("Nice".into()),
        postal_code: Some("06000".into()),
        notes: None,
    }
}

fn key() -> Key {
    Key {
        date: "2024-03-05".parse().unwrap(),
        description: "Trousseau principal".into(),
        property_id: None,
    }
}

fn alert(key_id: Option<&DocumentId>, status: AlertStatus) -> Alert {
    Alert {
        key_id: key_id.cloned(),
        alert_date: "2024-03-05T09:30:00Z".parse().unwrap(),
        description: "Récupérer les clés".into(),
        status,
    }
}

fn find<R>(records: Vec<Record<R>>, id: &DocumentId) -> Option<Record<R>> {
    records.into_iter().find(|r| &r.id == id)
}

pub async fn create_then_list_includes_record<S: DocumentStore>(resources: &Resources<S>) {
    let properties = resources.properties();

    let id = properties.create(property()).await.unwrap();

    assert!(!id.is_empty());
    let listed = find(properties.list().await.unwrap(), &id).expect("created property is listed");
    assert_eq!(property(), listed.data);
}

pub async fn create_stamps_both_timestamps<S: DocumentStore>(resources: &Resources<S>) {
    let keys = resources.keys();

    let id = keys.create(key()).await.unwrap();

    let record = find(keys.list().await.unwrap(), &id).unwrap();
    assert!(record.created_at.is_some());
    assert_eq!(record.created_at, record.updated_at);
}

pub async fn status_update_only_changes_status<S: DocumentStore>(resources: &Resources<S>) {
    let alerts = resources.alerts();
    let key_id = DocumentId::new("k1");
    let id = alerts
        .create(alert(Some(&key_id), AlertStatus::Pending))
        .await
        .unwrap();
    let before = find(alerts.list().await.unwrap(), &id).unwrap();

    alerts
        .update(&id, AlertPatch::status(AlertStatus::Dismissed))
        .await
        .unwrap();

    let after = find(alerts.list().await.unwrap(), &id).unwrap();
    assert_eq!(AlertStatus::Dismissed, after.data.status);
    assert_eq!(before.data.key_id, after.data.key_id);
    assert_eq!(before.data.alert_date, after.data.alert_date);
    assert_eq!(before.data.description, after.data.description);
    assert_eq!(before.created_at, after.created_at);
    assert!(after.updated_at > before.updated_at);
}

pub async fn empty_patch_still_refreshes_updated_at<S: DocumentStore>(resources: &Resources<S>) {
    let properties = resources.properties();
    let id = properties.create(property()).await.unwrap();
    let before = find(properties.list().await.unwrap(), &id).unwrap();

    properties
        .update(&id, PropertyPatch::default())
        .await
        .unwrap();

    let after = find(properties.list().await.unwrap(), &id).unwrap();
    assert_eq!(before.data, after.data);
    assert!(after.updated_at > before.updated_at);
}

pub async fn null_patch_field_clears_value<S: DocumentStore>(resources: &Resources<S>) {
    let properties = resources.properties();
    let id = properties.create(property()).await.unwrap();

    properties
        .update(
            &id,
            PropertyPatch {
                city: Field::Present(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = find(properties.list().await.unwrap(), &id).unwrap();
    assert_eq!(None, after.data.city);
    assert_eq!(Some("06000".to_string()), after.data.postal_code);
}

pub async fn update_of_missing_record_is_not_found<S: DocumentStore>(resources: &Resources<S>) {
    let err = resources
        .suppliers()
        .update(&DocumentId::new("0123456789abcdef01234567"), Default::default())
        .await
        .unwrap_err();

    assert_eq!(&StoreError::NotFound, err.current_context());
}

pub async fn remove_then_list_excludes_record<S: DocumentStore>(resources: &Resources<S>) {
    let suppliers = resources.suppliers();
    let id = suppliers
        .create(Supplier {
            name: "Serrurerie Martin".into(),
            service: Some("serrurier".into()),
            contact_name: None,
            phone: Some("0493000000".into()),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(Some(()), suppliers.remove(&id).await.unwrap());

    assert!(find(suppliers.list().await.unwrap(), &id).is_none());
    assert_eq!(None, suppliers.remove(&id).await.unwrap());
}

pub async fn alerts_for_key_are_exactly_that_key<S: DocumentStore>(resources: &Resources<S>) {
    let alerts = resources.alerts();
    let k1 = DocumentId::new("k1");
    let k2 = DocumentId::new("k2");
    let first = alerts
        .create(alert(Some(&k1), AlertStatus::Pending))
        .await
        .unwrap();
    let second = alerts
        .create(alert(Some(&k1), AlertStatus::Dismissed))
        .await
        .unwrap();
    alerts
        .create(alert(Some(&k2), AlertStatus::Pending))
        .await
        .unwrap();
    alerts.create(alert(None, AlertStatus::Pending)).await.unwrap();

    let mut ids: Vec<_> = alerts
        .list_for_key(&k1)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    ids.sort();

    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(expected, ids);
}

pub async fn list_of_empty_collection_is_empty<S: DocumentStore>(resources: &Resources<S>) {
    assert!(resources.alerts().list().await.unwrap().is_empty());
    assert!(resources.keys().list().await.unwrap().is_empty());
    assert!(resources.properties().list().await.unwrap().is_empty());
    assert!(resources.suppliers().list().await.unwrap().is_empty());
}

pub async fn blank_required_fields_are_refused<S: DocumentStore>(resources: &Resources<S>) {
    let properties = resources.properties();

    let err = properties
        .create(Property {
            name: "   ".into(),
            ..property()
        })
        .await
        .unwrap_err();
    assert_eq!(&StoreError::InvalidRecord, err.current_context());
    assert!(properties.list().await.unwrap().is_empty());

    let id = properties.create(property()).await.unwrap();
    let err = properties
        .update(
            &id,
            PropertyPatch {
                address: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(&StoreError::InvalidRecord, err.current_context());

    let stored = find(properties.list().await.unwrap(), &id).unwrap();
    assert_eq!(property(), stored.data);
}

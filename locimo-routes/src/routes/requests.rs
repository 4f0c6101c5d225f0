use locimo_core::calendar::CalendarMonth;
use locimo_core::model::{Alert, Key, Property, Resource, Supplier};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// The record collections exposed over HTTP.
#[derive(Debug, Deserialize, ToSchema, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Alerts,
    Keys,
    Properties,
    Suppliers,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            c if c == Alert::COLLECTION => Ok(Collection::Alerts),
            c if c == Key::COLLECTION => Ok(Collection::Keys),
            c if c == Property::COLLECTION => Ok(Collection::Properties),
            c if c == Supplier::COLLECTION => Ok(Collection::Suppliers),
            other => Err(UnknownCollection(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// The month to show as `YYYY-MM`. Defaults to the current month.
    #[param(value_type = Option<String>, example = "2024-03")]
    pub month: Option<CalendarMonth>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Field { field: String, value: String },
    TooMany(usize),
}

impl From<HashMap<String, String>> for ListFilter {
    fn from(query: HashMap<String, String>) -> Self {
        match query.len() {
            0 => ListFilter::All,
            1 => query
                .into_iter()
                .next()
                .map(|(field, value)| ListFilter::Field { field, value })
                .unwrap_or(ListFilter::All),
            n => ListFilter::TooMany(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alerts", Collection::Alerts)]
    #[case("keys", Collection::Keys)]
    #[case("properties", Collection::Properties)]
    #[case("suppliers", Collection::Suppliers)]
    fn collection_names_parse(#[case] name: &str, #[case] expected: Collection) {
        assert_eq!(expected, name.parse().unwrap());
    }

    #[test]
    fn unknown_collection_is_rejected() {
        assert!("tenants".parse::<Collection>().is_err());
    }

    #[test]
    fn query_maps_to_filter() {
        assert_eq!(ListFilter::All, ListFilter::from(HashMap::new()));

        let one = HashMap::from([("key_id".to_string(), "k1".to_string())]);
        assert_eq!(
            ListFilter::Field {
                field: "key_id".into(),
                value: "k1".into()
            },
            ListFilter::from(one)
        );

        let two = HashMap::from([
            ("key_id".to_string(), "k1".to_string()),
            ("status".to_string(), "Pending".to_string()),
        ]);
        assert_eq!(ListFilter::TooMany(2), ListFilter::from(two));
    }
}

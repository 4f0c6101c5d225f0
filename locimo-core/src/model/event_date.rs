use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DAY_FORMAT: &str = "%Y-%m-%d";
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const LOCAL_FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// The date an alert or key is relevant on, in whichever form the client stored it.
///
/// Only the calendar day matters for placement. Plain dates and offset-less date-times
/// already name their day; instants are moved into the calendar zone first. The text it
/// was read from is kept and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    when: When,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum When {
    Day(NaiveDate),
    Local(NaiveDateTime),
    At(DateTime<FixedOffset>),
}

impl EventDate {
    pub fn calendar_day(&self, zone: &FixedOffset) -> NaiveDate {
        match self.when {
            When::Day(d) => d,
            When::Local(dt) => dt.date(),
            When::At(at) => at.with_timezone(zone).date_naive(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<NaiveDate> for EventDate {
    fn from(value: NaiveDate) -> Self {
        Self {
            when: When::Day(value),
            text: value.format(DAY_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not a date (YYYY-MM-DD), a local date-time or an RFC 3339 instant")]
pub struct InvalidEventDate(String);

impl FromStr for EventDate {
    type Err = InvalidEventDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let when = if let Ok(day) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
            When::Day(day)
        } else if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            When::At(at)
        } else {
            NaiveDateTime::parse_from_str(s, LOCAL_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, LOCAL_FORMAT_NO_SECONDS))
                .map(When::Local)
                .map_err(|_| InvalidEventDate(s.to_string()))?
        };

        Ok(Self {
            when,
            text: s.to_string(),
        })
    }
}

impl Display for EventDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for EventDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

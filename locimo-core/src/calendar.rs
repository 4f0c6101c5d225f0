//! Month grid for the dashboard: which alerts and keys fall on which day.
//!
//! Everything here is a pure function of its inputs.

use crate::model::{Alert, Key, Record};
use chrono::{Datelike, FixedOffset, Months, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month. Always valid: the first day of it exists.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first
            .pred_opt()
            .unwrap_or(self.first)
    }

    pub fn previous(&self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    /// Every day of the month, first to last inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = self.first.month();
        self.first.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn day_count(&self) -> usize {
        self.days().count()
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' is not a month, expected YYYY-MM")]
pub struct InvalidMonth(String);

impl FromStr for CalendarMonth {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for CalendarMonth {
    type Error = InvalidMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarMonth> for String {
    fn from(value: CalendarMonth) -> Self {
        value.to_string()
    }
}

/// How days are decided and which day is "today".
#[derive(Debug, Clone, Copy)]
pub struct CalendarOptions {
    /// Instants are placed on the day they fall on in this zone.
    pub zone: FixedOffset,
    pub today: Option<NaiveDate>,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            zone: utc(),
            today: None,
        }
    }
}

impl CalendarOptions {
    pub fn in_zone(zone: FixedOffset) -> Self {
        Self { zone, today: None }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub alerts: Vec<Record<Alert>>,
    pub keys: Vec<Record<Key>>,
    pub has_alerts: bool,
    /// Only meaningful when `has_alerts`: distinguishes days with something still to do
    /// from days where every alert was dismissed.
    pub has_pending_alerts: bool,
    pub has_keys: bool,
    pub is_today: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthView {
    pub month: CalendarMonth,
    /// Empty cells before day 1 in a Monday-first week grid.
    pub leading_blanks: u32,
    /// Empty cells after the last day to complete its week row.
    pub trailing_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthView {
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Bucket `alerts` and `keys` onto the days of `month`.
///
/// Items are matched on calendar-day equality only, so an alert at midnight and one at
/// noon on the same day land in the same bucket. Items outside the month are ignored.
pub fn aggregate(
    month: CalendarMonth,
    alerts: &[Record<Alert>],
    keys: &[Record<Key>],
    options: &CalendarOptions,
) -> MonthView {
    let alert_days: Vec<_> = alerts
        .iter()
        .map(|a| a.data.alert_date.calendar_day(&options.zone))
        .collect();
    let key_days: Vec<_> = keys
        .iter()
        .map(|k| k.data.date.calendar_day(&options.zone))
        .collect();

    let days = month
        .days()
        .map(|date| {
            let day_alerts: Vec<_> = alerts
                .iter()
                .zip(&alert_days)
                .filter(|(_, d)| **d == date)
                .map(|(a, _)| a.clone())
                .collect();
            let day_keys: Vec<_> = keys
                .iter()
                .zip(&key_days)
                .filter(|(_, d)| **d == date)
                .map(|(k, _)| k.clone())
                .collect();

            CalendarDay {
                date,
                has_alerts: !day_alerts.is_empty(),
                has_pending_alerts: day_alerts.iter().any(|a| a.data.status.is_pending()),
                has_keys: !day_keys.is_empty(),
                is_today: options.today == Some(date),
                alerts: day_alerts,
                keys: day_keys,
            }
        })
        .collect();

    MonthView {
        month,
        leading_blanks: month.first_day().weekday().num_days_from_monday(),
        trailing_blanks: 6 - month.last_day().weekday().num_days_from_monday(),
        days,
    }
}

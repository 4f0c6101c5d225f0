use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

#[cfg(test)]
use mockall::automock;

/// Source of "now" for the write path.
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Timestamps are written with millisecond precision, so two writes landing in the same
/// millisecond would otherwise share an `updated_at`. This never hands out the same
/// (or an earlier) instant twice.
#[derive(Debug)]
pub struct MonotonicClock<C> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let now = truncate_to_millis(self.inner.now());
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let next = match *last {
            Some(prev) if now <= prev => prev + TimeDelta::milliseconds(1),
            _ => now,
        };

        *last = Some(next);
        next
    }
}

pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(MonotonicClock::new(SystemClock))
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-03-05T10:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

use crate::calendar::{CalendarMonth, CalendarOptions, MonthView, aggregate};
use crate::model::{Alert, Key, Property, Record, Supplier};
use crate::repository::Resources;
use crate::result::StoreResult;
use crate::store::DocumentStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Headline counts shown above the calendar.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub properties: usize,
    pub keys: usize,
    pub suppliers: usize,
    pub pending_alerts: usize,
}

/// Results of one dashboard load. Each fetch keeps its own outcome so a failing
/// collection does not hide the others.
#[derive(Debug)]
pub struct DashboardData {
    pub alerts: StoreResult<Vec<Record<Alert>>>,
    pub keys: StoreResult<Vec<Record<Key>>>,
    pub properties: StoreResult<Vec<Record<Property>>>,
    pub suppliers: StoreResult<Vec<Record<Supplier>>>,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(DashboardData),
    /// The caller went away before every fetch finished; nothing was kept.
    Abandoned,
}

impl DashboardData {
    /// Counts over whatever loaded, a failed fetch counts as zero.
    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            properties: count(&self.properties),
            keys: count(&self.keys),
            suppliers: count(&self.suppliers),
            pending_alerts: self
                .alerts
                .as_ref()
                .map(|alerts| alerts.iter().filter(|a| a.data.status.is_pending()).count())
                .unwrap_or_default(),
        }
    }

    pub fn month_view(&self, month: CalendarMonth, options: &CalendarOptions) -> MonthView {
        aggregate(
            month,
            self.alerts.as_deref().unwrap_or_default(),
            self.keys.as_deref().unwrap_or_default(),
            options,
        )
    }

    pub fn has_failures(&self) -> bool {
        self.alerts.is_err()
            || self.keys.is_err()
            || self.properties.is_err()
            || self.suppliers.is_err()
    }
}

fn count<T>(cell: &StoreResult<Vec<T>>) -> usize {
    cell.as_ref().map(Vec::len).unwrap_or_default()
}

/// Fetches everything the dashboard shows, concurrently.
#[derive(Debug, Clone)]
pub struct DashboardLoader<S> {
    resources: Resources<S>,
}

impl<S: DocumentStore> DashboardLoader<S> {
    pub fn new(resources: Resources<S>) -> Self {
        Self { resources }
    }

    #[instrument(skip_all)]
    pub async fn load(&self, cancel: &CancellationToken) -> LoadOutcome {
        let alerts = self.resources.alerts();
        let keys = self.resources.keys();
        let properties = self.resources.properties();
        let suppliers = self.resources.suppliers();

        let fetch = async {
            tokio::join!(alerts.list(), keys.list(), properties.list(), suppliers.list())
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("dashboard load abandoned");
                LoadOutcome::Abandoned
            }
            (alerts, keys, properties, suppliers) = fetch => {
                let data = DashboardData { alerts, keys, properties, suppliers };
                if data.has_failures() {
                    warn!("dashboard loaded with failed collections");
                }
                LoadOutcome::Loaded(data)
            }
        }
    }
}

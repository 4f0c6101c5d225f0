use crate::error::ServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use error_stack::Report;
use locimo_core::DashboardEngine;
use locimo_core::auth::{AuthProvider, LoginStatus};
use locimo_core::calendar::{CalendarMonth, CalendarOptions, MonthView, aggregate};
use locimo_core::dashboard::{DashboardData, DashboardLoader, LoadOutcome};
use locimo_core::model::{Record, Resource, Validate};
use locimo_core::result::{AuthError, StoreError, StoreResult};
use locimo_core::store::DocumentId;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Lifts a lower layer's report into the service taxonomy, keeping the original kind.
trait IntoServiceResult<T> {
    fn into_service(self) -> ServiceResult<T>;
}

impl<T> IntoServiceResult<T> for StoreResult<T> {
    fn into_service(self) -> ServiceResult<T> {
        self.map_err(|report: Report<StoreError>| {
            let kind = *report.current_context();
            report.change_context(ServiceError::Store(kind))
        })
    }
}

impl<T> IntoServiceResult<T> for Result<T, Report<AuthError>> {
    fn into_service(self) -> ServiceResult<T> {
        self.map_err(|report| {
            let kind = *report.current_context();
            report.change_context(ServiceError::Session(kind))
        })
    }
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(DocumentId),
    /// Required fields were blank, nothing was written.
    Invalid(Vec<&'static str>),
}

#[derive(Debug)]
pub enum PatchOutcome {
    Updated,
    NotFound,
    Invalid(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct DashboardService<E> {
    engine: E,
}

impl<E: DashboardEngine> DashboardService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#list", fields(collection = R::COLLECTION))]
    pub async fn list<R: Resource>(&self) -> ServiceResult<Vec<Record<R>>> {
        let records = self
            .engine
            .resources()
            .repository::<R>()
            .list()
            .await
            .into_service()?;

        metrics::increment_records_listed_by(R::COLLECTION, records.len());
        Ok(records)
    }

    #[instrument(skip_all, name = "service#list_by", fields(collection = R::COLLECTION, field = field))]
    pub async fn list_by<R: Resource>(
        &self,
        field: &str,
        value: String,
    ) -> ServiceResult<Vec<Record<R>>> {
        let records = self
            .engine
            .resources()
            .repository::<R>()
            .list_by_field(field, Value::String(value))
            .await
            .into_service()?;

        metrics::increment_records_listed_by(R::COLLECTION, records.len());
        Ok(records)
    }

    #[instrument(skip_all, name = "service#create", fields(collection = R::COLLECTION))]
    pub async fn create<R: Resource>(&self, data: R) -> ServiceResult<CreateOutcome> {
        let blank = data.blank_fields();
        if !blank.is_empty() {
            debug!("refusing to create, blank fields: {blank:?}");
            return Ok(CreateOutcome::Invalid(blank));
        }

        let id = self
            .engine
            .resources()
            .repository::<R>()
            .create(data)
            .await
            .into_service()?;

        metrics::increment_records_created(R::COLLECTION);
        Ok(CreateOutcome::Created(id))
    }

    #[instrument(skip(self, patch), name = "service#update", fields(collection = R::COLLECTION))]
    pub async fn update<R: Resource>(
        &self,
        id: &DocumentId,
        patch: R::Patch,
    ) -> ServiceResult<PatchOutcome> {
        let blank = patch.blank_fields();
        if !blank.is_empty() {
            debug!("refusing to update, blank fields: {blank:?}");
            return Ok(PatchOutcome::Invalid(blank));
        }

        let result = self
            .engine
            .resources()
            .repository::<R>()
            .update(id, patch)
            .await;

        match result {
            Ok(()) => {
                metrics::increment_records_updated(R::COLLECTION);
                Ok(PatchOutcome::Updated)
            }
            Err(report) if *report.current_context() == StoreError::NotFound => {
                debug!("{id} not found, nothing updated");
                Ok(PatchOutcome::NotFound)
            }
            Err(report) => Err::<PatchOutcome, _>(report).into_service(),
        }
    }

    #[instrument(skip(self), name = "service#remove", fields(collection = R::COLLECTION))]
    pub async fn remove<R: Resource>(&self, id: &DocumentId) -> OptServiceResult<()> {
        let removed = self
            .engine
            .resources()
            .repository::<R>()
            .remove(id)
            .await
            .into_service()?;

        if removed.is_some() {
            metrics::increment_records_removed(R::COLLECTION);
        }
        Ok(removed)
    }

    fn calendar_options(&self) -> CalendarOptions {
        let zone = self.engine.calendar_zone();
        CalendarOptions::in_zone(zone).with_today(Utc::now().with_timezone(&zone).date_naive())
    }

    /// The month containing today in the configured zone.
    pub fn current_month(&self) -> CalendarMonth {
        let zone = self.engine.calendar_zone();
        CalendarMonth::containing(Utc::now().with_timezone(&zone).date_naive())
    }

    #[instrument(skip(self), name = "service#month")]
    pub async fn month(&self, month: CalendarMonth) -> ServiceResult<MonthView> {
        let resources = self.engine.resources();
        let (alerts, keys) = (resources.alerts(), resources.keys());

        let (alerts, keys) = tokio::join!(alerts.list(), keys.list());
        let (alerts, keys) = (alerts.into_service()?, keys.into_service()?);

        Ok(aggregate(month, &alerts, &keys, &self.calendar_options()))
    }

    /// Loads every collection for the dashboard. `None` when `cancel` fired first.
    #[instrument(skip_all, name = "service#dashboard")]
    pub async fn dashboard(&self, cancel: &CancellationToken) -> Option<DashboardData> {
        match DashboardLoader::new(self.engine.resources()).load(cancel).await {
            LoadOutcome::Loaded(data) => Some(data),
            LoadOutcome::Abandoned => None,
        }
    }

    pub fn session(&self) -> LoginStatus {
        self.engine.auth().current()
    }

    #[instrument(skip(self), name = "service#logout")]
    pub async fn logout(&self) -> ServiceResult<()> {
        self.engine.auth().logout().await.into_service()?;
        info!("session closed");
        Ok(())
    }
}

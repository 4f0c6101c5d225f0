use crate::service::DashboardService;
use axum::extract::FromRef;
use locimo_core::DashboardEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct DashboardAppState<E: DashboardEngine> {
    pub service: DashboardService<E>,
    pub metrics: Option<PrometheusHandle>,
    /// Cancelled when the server starts shutting down; long loads give up on it.
    pub shutdown: CancellationToken,
}

impl<E: DashboardEngine> DashboardAppState<E> {
    pub fn new_with_metrics(engine: E, metrics: PrometheusHandle) -> Self {
        Self {
            service: DashboardService::new(engine),
            metrics: Some(metrics),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn new_without_metrics(engine: E) -> Self {
        Self {
            service: DashboardService::new(engine),
            metrics: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}

impl<E: DashboardEngine> FromRef<DashboardAppState<E>> for DashboardService<E> {
    fn from_ref(input: &DashboardAppState<E>) -> Self {
        input.service.clone()
    }
}

use crate::config::{AppConfig, StoreKind};
use crate::engine::LocimoEngine;
use crate::server::ServerProperties;
use axum::Router;
use dotenv::dotenv;
use error_stack::fmt::ColorMode;
use error_stack::{Report, ResultExt};
use locimo_core::auth::SessionAuth;
use locimo_core::store::DocumentStore;
use locimo_routes::state::DashboardAppState;
use repositories::memory::MemoryStore;
use repositories::mongo::{ConnectionDetails, MongoStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod engine;
mod server;

#[derive(Debug, thiserror::Error)]
#[error("the app exited with an error")]
pub struct AppError;

pub type AppResult<T> = Result<T, Report<AppError>>;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("locimo dashboard shutting down"),
        Err(e) => {
            error!("locimo dashboard exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("LOCIMO_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env()?;
    debug!("loaded config: {config:?}");

    match &config.store {
        StoreKind::Memory => {
            warn!("using the in-memory store, nothing survives a restart");
            serve(MemoryStore::new(), &config).await
        }
        StoreKind::Mongo { url, db_name } => {
            let store = build_mongo_store(url.clone(), db_name).await?;
            serve(store, &config).await
        }
    }
}

#[instrument(skip(url))]
async fn build_mongo_store(url: String, db_name: &str) -> AppResult<MongoStore> {
    debug!("initializing mongodb store");
    MongoStore::init(ConnectionDetails::Url(url), db_name)
        .await
        .change_context(AppError)
}

async fn serve<S: DocumentStore>(store: S, config: &AppConfig) -> AppResult<()> {
    let shutdown = CancellationToken::new();
    let routes = build_routes(store, config, shutdown.clone())?;

    server::run(
        routes,
        ServerProperties { port: config.port },
        shutdown,
    )
    .await
}

fn build_routes<S: DocumentStore>(
    store: S,
    config: &AppConfig,
    shutdown: CancellationToken,
) -> AppResult<Router> {
    let session = SessionAuth::resolved(config.operator.clone());
    let engine = LocimoEngine::new(store, session, config.calendar_zone);

    let state = if config.metrics_enabled {
        let handle = locimo_routes::metrics::setup_recorder().change_context(AppError)?;
        DashboardAppState::new_with_metrics(engine, handle)
    } else {
        DashboardAppState::new_without_metrics(engine)
    };

    debug!("building routes..");
    Ok(locimo_routes::routes::build(state.with_shutdown(shutdown)))
        .inspect(|_| debug!("routes built"))
}

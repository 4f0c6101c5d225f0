use crate::error::EndpointError;
use crate::metrics;
use crate::routes::api_doc::{MonthViewFields, PatchBody, RecordBody, RecordFields};
use crate::routes::requests::{CalendarQuery, Collection, ListFilter};
use crate::routes::responses::{ApiError, CreatedResponse, SessionResponse, StatsResponse};
use crate::service::{CreateOutcome, DashboardService, PatchOutcome};
use crate::session::require_session;
use crate::state::DashboardAppState;
use crate::stream::StreamingResponse;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response, Result},
    routing::{get, patch, post},
};
use locimo_core::DashboardEngine;
use locimo_core::auth::AuthUser;
use locimo_core::model::{Alert, Key, Property, Resource, Supplier};
use locimo_core::store::DocumentId;
use locimo_core::vcard::{ContactCard, VCARD_MIME};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, instrument};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

mod api_doc;
pub mod requests;
pub mod responses;

const API_ROOT_PATH: &str = "/api";

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = API_ROOT_PATH, api = DashboardDocs),
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    list_records,
    create_record,
    update_record,
    remove_record,
    month_calendar,
    dashboard_stats,
    current_session,
    logout,
    contact_card,
))]
struct DashboardDocs;

const COLLECTION_PATH: &str = "/{collection}";
const RECORD_PATH: &str = "/{collection}/{id}";
const CALENDAR_PATH: &str = "/calendar";
const STATS_PATH: &str = "/dashboard/stats";
const SESSION_PATH: &str = "/session";
const LOGOUT_PATH: &str = "/session/logout";
const CARD_PATH: &str = "/card.vcf";
const METRICS_PATH: &str = "/metrics";

pub fn build<E: DashboardEngine>(app_state: DashboardAppState<E>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router.merge(SwaggerUi::new("/api/swagger-ui").url("/api/api-docs/openapi.json", api))
}

fn routes<S, E: DashboardEngine>(app_state: DashboardAppState<E>) -> OpenApiRouter<S> {
    let protected = OpenApiRouter::new()
        .route(
            COLLECTION_PATH,
            get(list_records::<E>).post(create_record::<E>),
        )
        .route(
            RECORD_PATH,
            patch(update_record::<E>).delete(remove_record::<E>),
        )
        .route(CALENDAR_PATH, get(month_calendar::<E>))
        .route(STATS_PATH, get(dashboard_stats::<E>))
        .route(SESSION_PATH, get(current_session))
        .route(LOGOUT_PATH, post(logout::<E>))
        .route_layer(middleware::from_fn_with_state(
            app_state.service.clone(),
            require_session::<E>,
        ));

    let main_router = protected.route(CARD_PATH, get(contact_card));

    let router = match app_state.metrics.clone() {
        Some(metrics_handle) => {
            info!("metrics enabled, setting up metrics handler");
            main_router
                .route(
                    METRICS_PATH,
                    get(|| async move { metrics_handle.render() }),
                )
                .route_layer(middleware::from_fn(metrics::track_http))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            main_router.route(
                METRICS_PATH,
                get(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                    )
                }),
            )
        }
    };

    OpenApiRouter::new()
        .nest(API_ROOT_PATH, router)
        .with_state(app_state)
}

fn unknown_collection(name: &str) -> Response {
    ApiError::not_found(format!("unknown collection '{name}'")).into_response()
}

/// List the records of a collection, optionally narrowed by one `field=value` pair.
#[utoipa::path(
    get,
    path = COLLECTION_PATH,
    responses(
        (
            status = OK,
            description = "Every matching record, possibly none",
            body = Vec<RecordFields>,
            example = json!(api_doc::examples::alert_listing()),
        ),
        (status = BAD_REQUEST, description = "The filter is not supported for this collection", body = ApiError),
        (status = NOT_FOUND, description = "The collection does not exist", body = ApiError),
    ),
    params(
        ("collection" = Collection, Path, description = "The collection to list"),
        ("filter" = Option<HashMap<String, String>>, Query, style = Form, explode,
            description = "At most one `field=value` pair. Alerts filter on `key_id` or `status`, keys on `property_id`"),
    )
)]
#[instrument(skip(service, query), err(Debug))]
async fn list_records<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, EndpointError> {
    let filter = ListFilter::from(query);
    match collection.parse() {
        Ok(Collection::Alerts) => list_as::<E, Alert>(&service, filter).await,
        Ok(Collection::Keys) => list_as::<E, Key>(&service, filter).await,
        Ok(Collection::Properties) => list_as::<E, Property>(&service, filter).await,
        Ok(Collection::Suppliers) => list_as::<E, Supplier>(&service, filter).await,
        Err(_) => Ok(unknown_collection(&collection)),
    }
}

async fn list_as<E: DashboardEngine, R: Resource>(
    service: &DashboardService<E>,
    filter: ListFilter,
) -> Result<Response, EndpointError> {
    let records = match filter {
        ListFilter::All => service.list::<R>().await?,
        ListFilter::Field { field, value } if R::FILTERABLE.contains(&field.as_str()) => {
            service.list_by::<R>(&field, value).await?
        }
        ListFilter::Field { field, .. } => {
            return Ok(ApiError::bad_request(format!(
                "'{field}' cannot be used to filter {}",
                R::COLLECTION
            ))
            .into_response());
        }
        ListFilter::TooMany(n) => {
            return Ok(
                ApiError::bad_request(format!("at most one filter is supported, got {n}"))
                    .into_response(),
            );
        }
    };

    Ok(StreamingResponse::ok(records).into_response())
}

/// Create a record in a collection. Timestamps are set by the server.
#[utoipa::path(
    post,
    path = COLLECTION_PATH,
    responses(
        (status = CREATED, description = "The record was created", body = CreatedResponse),
        (status = NOT_FOUND, description = "The collection does not exist", body = ApiError),
        (status = UNPROCESSABLE_ENTITY, description = "The body does not describe a valid record for the collection", body = ApiError),
    ),
    params(
        ("collection" = Collection, Path, description = "The collection to create the record in"),
    ),
    request_body = RecordBody,
)]
#[instrument(skip(service, body), err(Debug))]
async fn create_record<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, EndpointError> {
    match collection.parse() {
        Ok(Collection::Alerts) => create_as::<E, Alert>(&service, body).await,
        Ok(Collection::Keys) => create_as::<E, Key>(&service, body).await,
        Ok(Collection::Properties) => create_as::<E, Property>(&service, body).await,
        Ok(Collection::Suppliers) => create_as::<E, Supplier>(&service, body).await,
        Err(_) => Ok(unknown_collection(&collection)),
    }
}

async fn create_as<E: DashboardEngine, R: Resource>(
    service: &DashboardService<E>,
    body: Value,
) -> Result<Response, EndpointError> {
    let data = match serde_json::from_value::<R>(body) {
        Ok(data) => data,
        Err(e) => return Ok(ApiError::unprocessable_entity(e.to_string()).into_response()),
    };

    let res = match service.create(data).await? {
        CreateOutcome::Created(id) => CreatedResponse { id }.into_response(),
        CreateOutcome::Invalid(fields) => ApiError::blank_fields(&fields).into_response(),
    };
    Ok(res)
}

/// Update some fields of a record. `updated_at` is always refreshed.
#[utoipa::path(
    patch,
    path = RECORD_PATH,
    responses(
        (status = NO_CONTENT, description = "The record was updated"),
        (status = NOT_FOUND, description = "The collection or the record does not exist", body = ApiError),
        (status = UNPROCESSABLE_ENTITY, description = "The patch is not valid for the collection", body = ApiError),
    ),
    params(
        ("collection" = Collection, Path, description = "The collection the record lives in"),
        ("id" = String, Path, description = "The record to update"),
    ),
    request_body = PatchBody,
)]
#[instrument(skip(service, body), err(Debug))]
async fn update_record<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, EndpointError> {
    let id = DocumentId::new(id);
    match collection.parse() {
        Ok(Collection::Alerts) => update_as::<E, Alert>(&service, &id, body).await,
        Ok(Collection::Keys) => update_as::<E, Key>(&service, &id, body).await,
        Ok(Collection::Properties) => update_as::<E, Property>(&service, &id, body).await,
        Ok(Collection::Suppliers) => update_as::<E, Supplier>(&service, &id, body).await,
        Err(_) => Ok(unknown_collection(&collection)),
    }
}

async fn update_as<E: DashboardEngine, R: Resource>(
    service: &DashboardService<E>,
    id: &DocumentId,
    body: Value,
) -> Result<Response, EndpointError> {
    let patch = match serde_json::from_value::<R::Patch>(body) {
        Ok(patch) => patch,
        Err(e) => return Ok(ApiError::unprocessable_entity(e.to_string()).into_response()),
    };

    let res = match service.update::<R>(id, patch).await? {
        PatchOutcome::Updated => StatusCode::NO_CONTENT.into_response(),
        PatchOutcome::NotFound => {
            ApiError::not_found(format!("no record {id} in {}", R::COLLECTION)).into_response()
        }
        PatchOutcome::Invalid(fields) => ApiError::blank_fields(&fields).into_response(),
    };
    Ok(res)
}

/// Delete a record. Deleting a record that does not exist is not an error.
#[utoipa::path(
    delete,
    path = RECORD_PATH,
    responses(
        (status = NO_CONTENT, description = "The record was deleted, or never existed"),
        (status = NOT_FOUND, description = "The collection does not exist", body = ApiError),
    ),
    params(
        ("collection" = Collection, Path, description = "The collection the record lives in"),
        ("id" = String, Path, description = "The record to delete"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn remove_record<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Response, EndpointError> {
    let id = DocumentId::new(id);
    match collection.parse() {
        Ok(Collection::Alerts) => service.remove::<Alert>(&id).await?,
        Ok(Collection::Keys) => service.remove::<Key>(&id).await?,
        Ok(Collection::Properties) => service.remove::<Property>(&id).await?,
        Ok(Collection::Suppliers) => service.remove::<Supplier>(&id).await?,
        Err(_) => return Ok(unknown_collection(&collection)),
    };

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The month grid with the alerts and keys falling on each day.
#[utoipa::path(
    get,
    path = CALENDAR_PATH,
    responses(
        (
            status = OK,
            description = "The month grid",
            body = MonthViewFields,
            example = json!(api_doc::examples::calendar_month()),
        ),
        (status = BAD_REQUEST, description = "The month is not a valid `YYYY-MM`"),
    ),
    params(CalendarQuery)
)]
#[instrument(skip(service), err(Debug))]
async fn month_calendar<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, EndpointError> {
    let month = query.month.unwrap_or_else(|| service.current_month());
    let view = service.month(month).await?;
    Ok(Json(view).into_response())
}

/// Headline counts for the dashboard. Collections that fail to load count as zero and are
/// named in `unavailable`.
#[utoipa::path(
    get,
    path = STATS_PATH,
    responses(
        (status = OK, description = "The counts", body = StatsResponse),
        (status = SERVICE_UNAVAILABLE, description = "The server is shutting down", body = ApiError),
    )
)]
#[instrument(skip(state))]
async fn dashboard_stats<E: DashboardEngine>(
    State(state): State<DashboardAppState<E>>,
) -> Response {
    let Some(data) = state.service.dashboard(&state.shutdown).await else {
        return ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "the server is shutting down")
            .into_response();
    };

    let unavailable = [
        (Alert::COLLECTION, data.alerts.is_err()),
        (Key::COLLECTION, data.keys.is_err()),
        (Property::COLLECTION, data.properties.is_err()),
        (Supplier::COLLECTION, data.suppliers.is_err()),
    ]
    .into_iter()
    .filter(|(_, failed)| *failed)
    .map(|(collection, _)| collection.to_string())
    .collect();

    Json(StatsResponse {
        stats: data.stats(),
        unavailable,
    })
    .into_response()
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = SESSION_PATH,
    responses(
        (status = OK, description = "The signed-in user", body = SessionResponse),
        (status = SEE_OTHER, description = "Nobody is signed in, redirects to the login page"),
        (status = SERVICE_UNAVAILABLE, description = "The session is still being resolved", body = ApiError),
    )
)]
async fn current_session(Extension(user): Extension<AuthUser>) -> Json<SessionResponse> {
    Json(SessionResponse::from(user))
}

/// Close the current session.
#[utoipa::path(
    post,
    path = LOGOUT_PATH,
    responses(
        (status = NO_CONTENT, description = "The session was closed"),
        (status = BAD_GATEWAY, description = "The session provider could not be reached", body = ApiError),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn logout<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
) -> Result<Response, EndpointError> {
    service.logout().await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The business contact card as a vCard download.
#[utoipa::path(
    get,
    path = CARD_PATH,
    responses(
        (status = OK, description = "vCard 3.0 text", content_type = "text/vcard", body = String),
    )
)]
async fn contact_card() -> Response {
    let card = ContactCard::locimo();
    (
        [
            (header::CONTENT_TYPE, format!("{VCARD_MIME}; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", card.file_name()),
            ),
        ],
        card.to_vcard(),
    )
        .into_response()
}

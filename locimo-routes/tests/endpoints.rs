use axum_test::TestServer;
use axum_test::http::StatusCode;
use chrono::FixedOffset;
use locimo_core::DashboardEngine;
use locimo_core::auth::{AuthProvider, AuthUser, SessionAuth};
use locimo_core::repository::Resources;
use locimo_core::result::StoreError;
use locimo_routes::state::DashboardAppState;
use repositories::memory::MemoryStore;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
struct TestEngine {
    store: MemoryStore,
    auth: SessionAuth,
}

impl DashboardEngine for TestEngine {
    type Store = MemoryStore;
    type Auth = SessionAuth;

    fn resources(&self) -> Resources<Self::Store> {
        Resources::new(self.store.clone())
    }

    fn auth(&self) -> Self::Auth {
        self.auth.clone()
    }

    fn calendar_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }
}

struct TestRuntime {
    server: TestServer,
    store: MemoryStore,
    auth: SessionAuth,
}

fn runtime_with(auth: SessionAuth, shutdown: CancellationToken) -> TestRuntime {
    let store = MemoryStore::new();
    let engine = TestEngine {
        store: store.clone(),
        auth: auth.clone(),
    };
    let state = DashboardAppState::new_without_metrics(engine).with_shutdown(shutdown);
    let server = TestServer::new(locimo_routes::routes::build(state)).unwrap();

    TestRuntime {
        server,
        store,
        auth,
    }
}

#[fixture]
fn signed_in() -> TestRuntime {
    let mut user = AuthUser::new("u1");
    user.email = Some("ange@locimoservices.fr".into());
    runtime_with(
        SessionAuth::resolved(Some(user)),
        CancellationToken::new(),
    )
}

async fn create(server: &TestServer, collection: &str, body: Value) -> String {
    let response = server.post(&format!("/api/{collection}")).json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_str().unwrap().to_string()
}

#[rstest]
#[tokio::test]
async fn created_property_is_listed(signed_in: TestRuntime) {
    let server = &signed_in.server;

    let id = create(
        server,
        "properties",
        json!({"name": "Villa Rose", "address": "1 rue de la République"}),
    )
    .await;

    let response = server.get("/api/properties").await;
    response.assert_status_ok();

    let listed: Vec<Value> = response.json();
    assert_eq!(1, listed.len());
    assert_eq!(id, listed[0]["id"]);
    assert_eq!("Villa Rose", listed[0]["name"]);
    assert!(listed[0]["created_at"].is_string());
    assert_eq!(listed[0]["created_at"], listed[0]["updated_at"]);
}

#[rstest]
#[tokio::test]
async fn empty_collection_lists_as_empty_array(signed_in: TestRuntime) {
    let response = signed_in.server.get("/api/suppliers").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[rstest]
#[case::get("GET")]
#[case::post("POST")]
#[tokio::test]
async fn unknown_collection_is_not_found(signed_in: TestRuntime, #[case] method: &str) {
    let server = &signed_in.server;

    let response = match method {
        "GET" => server.get("/api/tenants").await,
        _ => server.post("/api/tenants").json(&json!({})).await,
    };

    response.assert_status_not_found();
}

#[rstest]
#[case::blank_field(json!({"name": "  ", "address": "1 rue de la République"}))]
#[case::missing_field(json!({"name": "Villa Rose"}))]
#[case::wrong_type(json!({"name": 12, "address": "1 rue de la République"}))]
#[tokio::test]
async fn invalid_property_is_rejected(signed_in: TestRuntime, #[case] body: Value) {
    let server = &signed_in.server;

    server
        .post("/api/properties")
        .json(&body)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server.get("/api/properties").await.assert_json(&json!([]));
}

#[rstest]
#[tokio::test]
async fn patch_changes_only_given_fields(signed_in: TestRuntime) {
    let server = &signed_in.server;
    let id = create(
        server,
        "alerts",
        json!({
            "alert_date": "2024-03-05",
            "description": "Rendre les clés",
            "status": "Pending",
        }),
    )
    .await;

    server
        .patch(&format!("/api/alerts/{id}"))
        .json(&json!({"status": "Dismissed"}))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed: Vec<Value> = server.get("/api/alerts").await.json();
    assert_eq!("Dismissed", listed[0]["status"]);
    assert_eq!("Rendre les clés", listed[0]["description"]);
    assert_eq!("2024-03-05", listed[0]["alert_date"]);
}

#[rstest]
#[case::browser_iso_string("2024-03-05T09:30:00.000Z")]
#[case::local_minutes("2024-03-05T12:00")]
#[case::local_fraction("2024-03-05T12:00:00.500")]
#[tokio::test]
async fn event_dates_are_listed_as_written(signed_in: TestRuntime, #[case] raw: &str) {
    let server = &signed_in.server;
    create(
        server,
        "keys",
        json!({"date": raw, "description": "Trousseau Villa Rose"}),
    )
    .await;

    let listed: Vec<Value> = server.get("/api/keys").await.json();
    assert_eq!(1, listed.len());
    assert_eq!(raw, listed[0]["date"]);
}

#[rstest]
#[tokio::test]
async fn patch_of_missing_record_is_not_found(signed_in: TestRuntime) {
    signed_in
        .server
        .patch("/api/alerts/nope")
        .json(&json!({"status": "Dismissed"}))
        .await
        .assert_status_not_found();
}

#[rstest]
#[case::blank(json!({"description": ""}))]
#[case::unknown_field(json!({"colour": "red"}))]
#[tokio::test]
async fn invalid_patch_is_rejected(signed_in: TestRuntime, #[case] body: Value) {
    let server = &signed_in.server;
    let id = create(
        server,
        "keys",
        json!({"date": "2024-03-05", "description": "Trousseau Villa Rose"}),
    )
    .await;

    server
        .patch(&format!("/api/keys/{id}"))
        .json(&body)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[rstest]
#[tokio::test]
async fn delete_is_idempotent(signed_in: TestRuntime) {
    let server = &signed_in.server;
    let id = create(server, "suppliers", json!({"name": "Plomberie Martin"})).await;

    for _ in 0..2 {
        server
            .delete(&format!("/api/suppliers/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    server.get("/api/suppliers").await.assert_json(&json!([]));
}

#[rstest]
#[tokio::test]
async fn alerts_filter_by_key(signed_in: TestRuntime) {
    let server = &signed_in.server;
    for key_id in ["k1", "k1", "k2"] {
        create(
            server,
            "alerts",
            json!({
                "key_id": key_id,
                "alert_date": "2024-03-05",
                "description": "Rendre les clés",
                "status": "Pending",
            }),
        )
        .await;
    }

    let listed: Vec<Value> = server
        .get("/api/alerts")
        .add_query_param("key_id", "k1")
        .await
        .json();

    assert_eq!(2, listed.len());
    assert!(listed.iter().all(|alert| alert["key_id"] == "k1"));
}

#[rstest]
#[tokio::test]
async fn unsupported_filters_are_bad_requests(signed_in: TestRuntime) {
    let server = &signed_in.server;

    server
        .get("/api/alerts")
        .add_query_param("description", "x")
        .await
        .assert_status_bad_request();

    server
        .get("/api/alerts")
        .add_query_param("key_id", "k1")
        .add_query_param("status", "Pending")
        .await
        .assert_status_bad_request();
}

#[rstest]
#[tokio::test]
async fn unavailable_store_is_bad_gateway(signed_in: TestRuntime) {
    signed_in
        .store
        .fail_collection("keys", StoreError::Unavailable);

    signed_in
        .server
        .get("/api/keys")
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[rstest]
#[tokio::test]
async fn calendar_places_alerts_on_their_day(signed_in: TestRuntime) {
    let server = &signed_in.server;
    create(
        server,
        "alerts",
        json!({
            "alert_date": "2024-03-05T12:00:00",
            "description": "Rendre les clés",
            "status": "Pending",
        }),
    )
    .await;

    let response = server
        .get("/api/calendar")
        .add_query_param("month", "2024-03")
        .await;
    response.assert_status_ok();

    let view: Value = response.json();
    assert_eq!("2024-03", view["month"]);
    let days = view["days"].as_array().unwrap();
    assert_eq!(31, days.len());
    assert_eq!("2024-03-05", days[4]["date"]);
    assert_eq!(true, days[4]["has_pending_alerts"]);
    assert_eq!(false, days[4]["has_keys"]);
    assert_eq!(false, days[5]["has_alerts"]);
}

#[rstest]
#[tokio::test]
async fn calendar_rejects_malformed_month(signed_in: TestRuntime) {
    signed_in
        .server
        .get("/api/calendar")
        .add_query_param("month", "2024-13")
        .await
        .assert_status_bad_request();
}

#[rstest]
#[tokio::test]
async fn stats_report_failing_collections(signed_in: TestRuntime) {
    let server = &signed_in.server;
    create(
        server,
        "properties",
        json!({"name": "Villa Rose", "address": "1 rue de la République"}),
    )
    .await;
    create(server, "suppliers", json!({"name": "Plomberie Martin"})).await;
    signed_in
        .store
        .fail_collection("suppliers", StoreError::PermissionDenied);

    let response = server.get("/api/dashboard/stats").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "properties": 1,
        "keys": 0,
        "suppliers": 0,
        "pending_alerts": 0,
        "unavailable": ["suppliers"],
    }));
}

#[tokio::test]
async fn stats_during_shutdown_are_unavailable() {
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let runtime = runtime_with(SessionAuth::resolved(Some(AuthUser::new("u1"))), shutdown);

    runtime
        .server
        .get("/api/dashboard/stats")
        .await
        .assert_status_service_unavailable();
}

#[tokio::test]
async fn loading_session_serves_nothing() {
    let runtime = runtime_with(SessionAuth::new(), CancellationToken::new());

    runtime
        .server
        .get("/api/alerts")
        .await
        .assert_status_service_unavailable();
}

#[tokio::test]
async fn missing_session_redirects_to_login() {
    let runtime = runtime_with(SessionAuth::resolved(None), CancellationToken::new());

    let response = runtime.server.get("/api/properties").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!("/login", response.header("location"));
}

#[tokio::test]
async fn every_request_without_session_is_redirected() {
    let runtime = runtime_with(SessionAuth::resolved(None), CancellationToken::new());

    for path in ["/api/alerts", "/api/alerts", "/api/session"] {
        let response = runtime.server.get(path).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!("/login", response.header("location"));
    }
}

#[rstest]
#[tokio::test]
async fn session_shows_label_for_nameless_user(signed_in: TestRuntime) {
    let response = signed_in.server.get("/api/session").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "id": "u1",
        "display_name": "Utilisateur",
        "email": "ange@locimoservices.fr",
        "photo_url": null,
    }));
}

#[rstest]
#[tokio::test]
async fn logout_closes_the_session(signed_in: TestRuntime) {
    let server = &signed_in.server;

    server
        .post("/api/session/logout")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(signed_in.auth.current().user().is_none());
    server
        .get("/api/session")
        .await
        .assert_status(StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn contact_card_needs_no_session() {
    let runtime = runtime_with(SessionAuth::new(), CancellationToken::new());

    let response = runtime.server.get("/api/card.vcf").await;

    response.assert_status_ok();
    assert_eq!(
        "text/vcard; charset=utf-8",
        response.header("content-type")
    );
    assert_eq!(
        "attachment; filename=\"Ange KANGA.vcf\"",
        response.header("content-disposition")
    );
    let body = response.text();
    assert!(body.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"));
    assert!(body.ends_with("END:VCARD\r\n"));
}

#[rstest]
#[tokio::test]
async fn metrics_disabled_is_unavailable(signed_in: TestRuntime) {
    signed_in
        .server
        .get("/api/metrics")
        .await
        .assert_status_service_unavailable();
}

#[rstest]
#[tokio::test]
async fn openapi_document_is_served(signed_in: TestRuntime) {
    let response = signed_in.server.get("/api/api-docs/openapi.json").await;

    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/{collection}"].is_object());
    assert!(doc["paths"]["/api/calendar"].is_object());
}

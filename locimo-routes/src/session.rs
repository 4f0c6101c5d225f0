use crate::routes::responses::ApiError;
use crate::service::DashboardService;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use locimo_core::DashboardEngine;
use locimo_core::guard::{GuardAction, LOGIN_PATH, RouteGuard};
use tracing::{debug, instrument};

/// Lets a request through only once the session has resolved to a signed-in user, who is
/// then available to handlers as an `Extension<AuthUser>`.
///
/// Each request is its own resolution: a visitor without a session is redirected to the
/// login page, and nothing is served while the session is still loading.
#[instrument(skip_all, fields(path = request.uri().path()))]
pub async fn require_session<E: DashboardEngine>(
    State(service): State<DashboardService<E>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match RouteGuard::new().observe(&service.session()) {
        GuardAction::Render(user) => {
            debug!("session user '{}'", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardAction::ShowLoading => {
            debug!("session still loading");
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "the session is still being resolved",
            )
            .into_response()
        }
        // A fresh guard never holds, every request without a user is redirected.
        GuardAction::Redirect { .. } | GuardAction::Hold => {
            debug!("no session, redirecting to {LOGIN_PATH}");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

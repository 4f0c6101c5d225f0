use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use locimo_core::auth::AuthUser;
use locimo_core::dashboard::DashboardStats;
use locimo_core::store::DocumentId;
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

pub type ErrorMessageType = Cow<'static, str>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip)]
    status_code: StatusCode,
    #[schema(value_type = String)]
    message: ErrorMessageType,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable_entity(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn blank_fields(fields: &[&'static str]) -> Self {
        Self::unprocessable_entity(format!("required fields are blank: {}", fields.join(", ")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: DocumentId,
}

impl IntoResponse for CreatedResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Collections that could not be loaded; their counts are reported as 0.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    /// The user's display name, or a generic label when they have none.
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl From<AuthUser> for SessionResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            display_name: user.display_label().to_string(),
            id: user.id,
            email: user.email,
            photo_url: user.photo_url,
        }
    }
}

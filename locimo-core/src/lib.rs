use auth::AuthProvider;
use repository::Resources;
use store::DocumentStore;

pub mod auth;
pub mod calendar;
pub mod clock;
pub mod dashboard;
pub mod guard;
pub mod model;
pub mod repository;
pub mod result;
pub mod store;
pub mod vcard;

/// The set of service handles the dashboard runs on. Everything is
/// constructed by the application and handed down, nothing is global.
pub trait DashboardEngine: Clone + Send + Sync + 'static {
    type Store: DocumentStore;
    type Auth: AuthProvider;

    fn resources(&self) -> Resources<Self::Store>;
    fn auth(&self) -> Self::Auth;
    fn calendar_zone(&self) -> chrono::FixedOffset;
}

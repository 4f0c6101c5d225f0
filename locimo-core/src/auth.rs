use crate::result::{AuthError, AuthResult};
use error_stack::Report;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument};
use utoipa::ToSchema;

const DEFAULT_DISPLAY_NAME: &str = "Utilisateur";

/// The signed-in user as the identity provider describes them.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    /// Name to show for the user, falling back to a generic label.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Where the provider is with working out who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    Loading,
    Resolved(Option<AuthUser>),
}

impl LoginStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, LoginStatus::Resolved(_))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            LoginStatus::Resolved(user) => user.as_ref(),
            LoginStatus::Loading => None,
        }
    }
}

/// Capability set of the identity provider. The session lifecycle belongs to the provider,
/// callers only observe it.
pub trait AuthProvider: Clone + Send + Sync + 'static {
    fn subscribe(&self) -> watch::Receiver<LoginStatus>;

    fn current(&self) -> LoginStatus {
        self.subscribe().borrow().clone()
    }

    fn logout(&self) -> impl Future<Output = AuthResult<()>> + Send;
}

/// In-process session handle. Whatever talks to the real identity provider pushes its
/// answers in through [`SessionAuth::resolve`]; everyone else subscribes.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    status: watch::Sender<LoginStatus>,
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAuth {
    /// Starts out `Loading`.
    pub fn new() -> Self {
        let (status, _) = watch::channel(LoginStatus::Loading);
        Self { status }
    }

    pub fn resolved(user: Option<AuthUser>) -> Self {
        let session = Self::new();
        session.resolve(user);
        session
    }

    #[instrument(skip_all)]
    pub fn resolve(&self, user: Option<AuthUser>) {
        match &user {
            Some(u) => info!("session resolved for user '{}'", u.id),
            None => info!("session resolved without a user"),
        }
        self.status.send_replace(LoginStatus::Resolved(user));
    }
}

impl AuthProvider for SessionAuth {
    fn subscribe(&self) -> watch::Receiver<LoginStatus> {
        self.status.subscribe()
    }

    async fn logout(&self) -> AuthResult<()> {
        if !self.status.borrow().is_resolved() {
            return Err(Report::new(AuthError::Logout)
                .attach("the session has not been resolved yet"));
        }
        self.resolve(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_falls_back_when_name_missing_or_blank() {
        let mut user = AuthUser::new("u1");
        assert_eq!("Utilisateur", user.display_label());

        user.display_name = Some("  ".into());
        assert_eq!("Utilisateur", user.display_label());

        user.display_name = Some("Ange".into());
        assert_eq!("Ange", user.display_label());
    }

    #[tokio::test]
    async fn subscribers_see_resolution() {
        let session = SessionAuth::new();
        let mut rx = session.subscribe();
        assert_eq!(LoginStatus::Loading, *rx.borrow());

        session.resolve(Some(AuthUser::new("u1")));

        rx.changed().await.unwrap();
        assert_eq!(Some("u1"), rx.borrow().user().map(|u| u.id.as_str()));
    }

    #[tokio::test]
    async fn logout_clears_the_user() {
        let session = SessionAuth::resolved(Some(AuthUser::new("u1")));

        session.logout().await.unwrap();

        assert_eq!(LoginStatus::Resolved(None), session.current());
    }

    #[tokio::test]
    async fn logout_before_resolution_fails() {
        let session = SessionAuth::new();

        let err = session.logout().await.unwrap_err();

        assert_eq!(&AuthError::Logout, err.current_context());
        assert_eq!(LoginStatus::Loading, session.current());
    }
}

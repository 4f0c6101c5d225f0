use crate::auth::{AuthUser, LoginStatus};
use crate::result::{AuthError, AuthResult};
use error_stack::ResultExt;
use tokio::sync::watch;
use tracing::{debug, instrument};

pub const LOGIN_PATH: &str = "/login";

/// What the guard knows about the current visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Authenticated(AuthUser),
    Unauthenticated,
}

impl From<&LoginStatus> for GuardState {
    fn from(status: &LoginStatus) -> Self {
        match status {
            LoginStatus::Loading => GuardState::Loading,
            LoginStatus::Resolved(Some(user)) => GuardState::Authenticated(user.clone()),
            LoginStatus::Resolved(None) => GuardState::Unauthenticated,
        }
    }
}

/// What should happen to the protected content for a given guard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    ShowLoading,
    Render(AuthUser),
    Redirect { to: &'static str },
    /// Unauthenticated, but the redirect has already been issued.
    Hold,
}

/// Gate in front of protected content.
///
/// Nothing protected is ever rendered while the session is loading or absent, and a missing
/// session is redirected to [`LOGIN_PATH`] exactly once per resolution.
#[derive(Debug, Default, Clone)]
pub struct RouteGuard {
    redirected: bool,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, status: &LoginStatus) -> GuardAction {
        match GuardState::from(status) {
            GuardState::Loading => {
                self.redirected = false;
                GuardAction::ShowLoading
            }
            GuardState::Authenticated(user) => {
                self.redirected = false;
                GuardAction::Render(user)
            }
            GuardState::Unauthenticated if self.redirected => GuardAction::Hold,
            GuardState::Unauthenticated => {
                self.redirected = true;
                GuardAction::Redirect { to: LOGIN_PATH }
            }
        }
    }

    /// Wait until the provider has resolved the session. There is no timeout: a provider
    /// that never answers keeps the caller in the loading state.
    #[instrument(skip_all)]
    pub async fn wait_resolved(
        status: &mut watch::Receiver<LoginStatus>,
    ) -> AuthResult<Option<AuthUser>> {
        let resolved = status
            .wait_for(LoginStatus::is_resolved)
            .await
            .change_context(AuthError::Unavailable)
            .attach("the session provider went away before resolving")?;

        let user = resolved.user().cloned();
        debug!("session resolved, authenticated: {}", user.is_some());
        Ok(user)
    }
}

use error_stack::Report;

pub type StoreResult<T> = Result<T, Report<StoreError>>;
pub type OptStoreResult<T> = Result<Option<T>, Report<StoreError>>;
pub type AuthResult<T> = Result<T, Report<AuthError>>;

/// Failures a document store (or the access layer sitting directly on top of it) can report.
/// These are passed through to callers as-is, nothing here is retried.
#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("the document store could not be reached")]
    Unavailable,
    #[error("the requested document does not exist")]
    NotFound,
    #[error("the document store denied access")]
    PermissionDenied,
    #[error("a stored document does not match the expected record shape")]
    InvalidRecord,
}

#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("the authentication provider could not be reached")]
    Unavailable,
    #[error("the session could not be closed")]
    Logout,
}

use crate::error::ServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<ServiceError>>;
pub type OptServiceResult<T> = Result<Option<T>, Report<ServiceError>>;

pub mod error;
pub mod metrics;
pub mod routes;
pub mod service;
mod session;
pub mod state;
mod stream;

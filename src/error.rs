//! Error taxonomy
//!
//! Repositories surface every storage failure as [`DataAccessError`]; the
//! services validate first, then translate repository failures into a
//! [`ServiceError`] carrying the operation's context. Handlers map each
//! service error kind onto an HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// The single error kind the repository layer emits. Callers never see
/// storage-specific error types.
#[derive(Debug, Error)]
#[error("data access failed: {0}")]
pub struct DataAccessError(#[from] pub rusqlite::Error);

pub type RepoResult<T> = Result<T, DataAccessError>;

/// Business-level errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required field missing or value out of range.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation detected before the store was touched.
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Actor's role or ownership does not authorize the action.
    #[error("{0}")]
    Permission(String),

    /// Cross-entity rule violation.
    #[error("{0}")]
    BusinessRule(String),

    /// Underlying store failure, annotated with the failing operation.
    #[error("{op}: {source}")]
    DataAccess {
        op: &'static str,
        #[source]
        source: DataAccessError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Wraps a repository failure with the name of the operation that hit it.
    pub fn dax(op: &'static str) -> impl FnOnce(DataAccessError) -> ServiceError {
        move |source| ServiceError::DataAccess { op, source }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Permission(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::DataAccess { op, source } => {
                tracing::error!("{}: {}", op, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use corkboard_db::DbError;

use crate::authz::Denial;
use crate::lifecycle::LifecycleError;

/// The service-wide failure taxonomy. Every handler returns this; the
/// `IntoResponse` impl is the single place status codes are assigned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("insufficient rights")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("restore failed: {0}")]
    RestoreFailed(String),

    #[error("backup failed: {0}")]
    BackupFailed(String),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RestoreFailed(_) | ApiError::BackupFailed(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Validation(msg) => ApiError::Validation(msg),
            DbError::NotFound => ApiError::NotFound,
            other => {
                error!("database error: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<Denial> for ApiError {
    fn from(d: Denial) -> Self {
        match d {
            Denial::Unauthenticated => ApiError::Unauthenticated,
            Denial::Unauthorized => ApiError::Unauthorized,
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::Restore(msg) => ApiError::RestoreFailed(msg),
            LifecycleError::Backup(msg) => ApiError::BackupFailed(msg),
        }
    }
}

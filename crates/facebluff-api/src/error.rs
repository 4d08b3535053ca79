use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use facebluff_db::DbError;

/// Handler failure, mapped onto an HTTP status with a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("invalid credentials")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("service temporarily unavailable")]
    Unavailable(#[source] DbError),

    #[error("internal server error")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_constraint() {
            ApiError::Conflict("conflicts with existing data".into())
        } else if err.is_transient() {
            ApiError::Unavailable(err)
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(format!("token encoding failed: {}", err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unavailable(e) => warn!("Database unavailable: {}", e),
            ApiError::Internal(detail) => error!("Request failed: {}", detail),
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

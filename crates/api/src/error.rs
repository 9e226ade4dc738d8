//! HTTP error mapping

use alerting::AlertError;
use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error body shared by every route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Alert(#[from] AlertError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidRequest => ApiError::Unauthorized("Invalid login request".to_string()),
            AuthError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(_) => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::LoginFailed | AuthError::Backend(_) => {
                ApiError::Unauthorized("Login failed".to_string())
            }
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Alert(e) => match e {
                AlertError::InvalidDraft(_) => StatusCode::BAD_REQUEST,
                AlertError::NotFound(_) => StatusCode::NOT_FOUND,
                AlertError::Conflict(_) | AlertError::NotFoundDuringUpdate(_) => {
                    StatusCode::CONFLICT
                }
                AlertError::AmbiguousMatch { .. } | AlertError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

//! Mapping of core errors onto HTTP responses

use crate::types::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use patotas_core::core_identity::IdentityError;
use patotas_core::core_patota::{PatotaError, Severity, UserNotice};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or invalid session token")]
    Unauthenticated,

    /// Caller is signed in but not a member of the Patota
    #[error("Access denied")]
    AccessDenied,

    #[error(transparent)]
    Patota(#[from] PatotaError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::Patota(e) => match e {
                PatotaError::Validation(_) => StatusCode::BAD_REQUEST,
                PatotaError::NotFound(_) => StatusCode::NOT_FOUND,
                PatotaError::Authorization(_) => StatusCode::FORBIDDEN,
                PatotaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Identity(e) => match e {
                IdentityError::InvalidCredentials | IdentityError::SessionNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
                IdentityError::Conflict(_) => StatusCode::CONFLICT,
                IdentityError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn notice(&self) -> UserNotice {
        match self {
            ApiError::Unauthenticated => UserNotice::from(&IdentityError::SessionNotFound),
            ApiError::AccessDenied => UserNotice {
                severity: Severity::Error,
                title: "Access denied".to_string(),
                description: "You are not a member of this patota.".to_string(),
            },
            ApiError::Patota(e) => UserNotice::from(e),
            ApiError::Identity(e) => UserNotice::from(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let notice = self.notice();

        let body = ErrorBody {
            title: notice.title,
            description: notice.description,
        };
        (status, Json(body)).into_response()
    }
}

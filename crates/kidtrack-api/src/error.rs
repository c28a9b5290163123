//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use kidtrack_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Response-layer wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts from
/// `AppError` via `From`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Expired => StatusCode::GONE,
            ErrorKind::LimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::ExternalService
            | ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_maps_to_gone() {
        let response = ApiError(AppError::expired("lapsed")).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn test_limit_exceeded_maps_to_too_many_requests() {
        let response = ApiError(AppError::limit_exceeded("cap")).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

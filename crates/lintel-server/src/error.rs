//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use lintel_core::errors::{AuthError, EvaluationError, LintelErrorCode, StorageError};

/// Result type for handler operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a handler can surface. Internal details are logged, not
/// serialized: the client sees a sanitized message for 5xx.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Unprocessable(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("evaluation error: {0}")]
    Evaluation(EvaluationError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("dependency unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, .. } => ApiError::NotFound { entity },
            other => ApiError::Storage(other),
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::Storage(inner) => ApiError::from(inner),
            other => ApiError::Evaluation(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) | ApiError::Evaluation(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Auth(e) => e.error_code(),
            ApiError::NotFound { .. } => "LINTEL_NOT_FOUND",
            ApiError::Unprocessable(_) => "LINTEL_UNPROCESSABLE",
            ApiError::Storage(e) => e.error_code(),
            ApiError::Evaluation(e) => e.error_code(),
            ApiError::Internal(_) => "LINTEL_INTERNAL",
            ApiError::Unavailable(_) => "LINTEL_UNAVAILABLE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            // Log the real error with context; return a generic message.
            tracing::error!(error = %self, code = self.code(), "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

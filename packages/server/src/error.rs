use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{ConvertError, FragmentError, MediaTypeError};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `"error"`.
    #[schema(example = "error")]
    pub status: &'static str,
    pub error: ErrorDetail,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    /// HTTP status code, repeated in the body.
    #[schema(example = 404)]
    pub code: u16,
    #[schema(example = "fragment 30a84843-0cd4-4975-95ba-b96112aea189 not found")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized,
    NotFound(String),
    PayloadTooLarge,
    UnsupportedMediaType(String),
    Internal(String),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".into()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "request body is too large".into(),
            ),
            AppError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = ErrorBody {
            status: "error",
            error: ErrorDetail {
                code: status.as_u16(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<FragmentError> for AppError {
    fn from(err: FragmentError) -> Self {
        match err {
            FragmentError::Validation(msg) => AppError::Validation(msg),
            FragmentError::NotFound(msg) => AppError::NotFound(msg),
            FragmentError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        match &err {
            ConvertError::Unsupported { .. } => AppError::UnsupportedMediaType(err.to_string()),
            ConvertError::Failed(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<MediaTypeError> for AppError {
    fn from(err: MediaTypeError) -> Self {
        AppError::UnsupportedMediaType(err.to_string())
    }
}

/// Error types for asset-service
///
/// Every error is rendered as the shared `ErrorResponse` JSON body with a
/// status that tells clients which stage failed.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use thiserror::Error;

use crate::services::ResolveError;

/// Result type for asset-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Requested asset does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid or missing request parameters
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Stored bytes are not a decodable image
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Object store transfer failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resizing or encoding failed
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Dependency not ready
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::MEDIA_NOT_FOUND),
            AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
            AppError::UnsupportedImage(_) => {
                (kinds::VALIDATION_ERROR, error_codes::UNSUPPORTED_FORMAT)
            }
            AppError::Storage(_) => (kinds::UPSTREAM_ERROR, error_codes::STORAGE_TRANSFER_FAILED),
            AppError::Processing(_) => (kinds::SERVER_ERROR, error_codes::MEDIA_PROCESSING_FAILED),
            AppError::Unavailable(_) => (
                kinds::SERVICE_UNAVAILABLE_ERROR,
                error_codes::SERVICE_UNAVAILABLE,
            ),
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Processing(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.kind_and_code();

        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &self.to_string(),
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(key) => AppError::NotFound(format!("asset {key}")),
            ResolveError::InvalidRequest(msg) => AppError::BadRequest(msg),
            e @ ResolveError::DecodeFailure { .. } => AppError::UnsupportedImage(e.to_string()),
            e @ ResolveError::TransferFailure(_) => AppError::Storage(e.to_string()),
            e @ ResolveError::EncodeFailure(_) => AppError::Processing(e.to_string()),
            e @ (ResolveError::Scratch(_) | ResolveError::Internal(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_errors_map_to_distinct_statuses() {
        let cases = [
            (ResolveError::NotFound("a.jpg".into()), StatusCode::NOT_FOUND),
            (
                ResolveError::DecodeFailure {
                    key: "a.jpg".into(),
                    message: "bad magic".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ResolveError::TransferFailure("timeout".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ResolveError::EncodeFailure("oom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ResolveError::InvalidRequest("size".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_error_response_codes() {
        let err = AppError::from(ResolveError::TransferFailure("reset".into()));
        assert_eq!(
            err.kind_and_code(),
            (kinds::UPSTREAM_ERROR, error_codes::STORAGE_TRANSFER_FAILED)
        );

        let err = AppError::from(ResolveError::NotFound("x".into()));
        assert_eq!(err.kind_and_code().1, error_codes::MEDIA_NOT_FOUND);
        assert_eq!(err.error_response().status(), StatusCode::NOT_FOUND);
    }
}

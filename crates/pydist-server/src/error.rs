//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pydist_service::Error as ServiceError;
use serde::{Deserialize, Serialize};

/// Tracing target for response mapping.
const TRACING_TARGET: &str = "pydist_server::error";

/// JSON body carried by every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error detail object.
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code, e.g. `NOT_FOUND` or `UNSUPPORTED_FORMAT`.
    pub code: String,
    /// Description of what went wrong, including the offending URL or path.
    pub message: String,
}

/// The error type for HTTP handlers.
///
/// Built from a [`ServiceError`] via `?` in handlers; serializes into an
/// [`ErrorBody`] with the mapped status code.
#[derive(Debug)]
#[must_use = "errors do nothing unless serialized"]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    /// Creates the not-found error used for unknown routes.
    pub fn route_not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: "no such route".to_owned(),
        }
    }

    /// Creates an internal error from an arbitrary failure.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL",
            message: err.to_string(),
        }
    }

    /// Returns the response status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the stable error code.
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::UnsupportedFormat { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            // The upstream's own verdict is passed through to the client.
            ServiceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServiceError::FetchFailed { .. }
            | ServiceError::TooLarge { .. }
            | ServiceError::Decode { .. } => StatusCode::BAD_GATEWAY,
        };

        if err.is_server_error() {
            tracing::warn!(target: TRACING_TARGET, error = %err, "Request failed");
        }

        Self {
            status,
            code: err.kind().into(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_owned(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_maps_to_bad_request() {
        let err = AppError::from(ServiceError::unsupported_format("http://host/pkg.rar"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "UNSUPPORTED_FORMAT");
        let _ = err.into_response();
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err = AppError::from(ServiceError::Upstream {
            url: "http://host/pkg.whl".to_owned(),
            status: 404,
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "UPSTREAM");

        let err = AppError::from(ServiceError::Upstream {
            url: "http://host/pkg.whl".to_owned(),
            status: 503,
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_upstream_status_falls_back_to_bad_gateway() {
        let err = AppError::from(ServiceError::Upstream {
            url: "http://host/pkg.whl".to_owned(),
            status: 42,
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_missing_member_maps_to_not_found() {
        let err = AppError::from(ServiceError::NotFound {
            url: "http://host/pkg.whl".to_owned(),
            path: "a.txt".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_oversize_maps_to_bad_gateway() {
        let err = AppError::from(ServiceError::TooLarge {
            url: "http://host/pkg.whl".to_owned(),
            limit_bytes: 128,
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "TOO_LARGE");
    }
}

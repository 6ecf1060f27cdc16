//! HTTP error mapping.
//!
//! Every failure leaving a handler becomes a JSON body of the form
//! `{"error": "<message>"}` with the status of its [`ServiceError`] kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use amolo_core::ServiceError;

use crate::bootstrap::Environment;

/// Message substituted for internal failures in production.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A classified relay failure.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// No route matched the request.
    #[error("Endpoint not found")]
    NotFound { path: String },
}

impl HttpError {
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Hide internal detail when running in production.
    #[must_use]
    pub fn redacted(self, environment: Environment) -> Self {
        match self {
            Self::Service(ServiceError::Internal(_)) if environment.is_production() => {
                Self::Service(ServiceError::Internal(INTERNAL_ERROR_MESSAGE.to_string()))
            }
            other => other,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Service(err) => ErrorBody {
                error: err.message().to_string(),
                path: None,
            },
            Self::NotFound { path } => ErrorBody {
                error: "Endpoint not found".to_string(),
                path: Some(path),
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

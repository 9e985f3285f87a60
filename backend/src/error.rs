//! Error handling for the VIEWS forecast API
//!
//! Every failure leaves the service as `{"error": {code, message, field?, detail?}}`

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::QueryRejection;
use serde::Serialize;
use shared::error::QueryError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    // Server errors
    #[error("Forecast data is unavailable")]
    DataUnavailable { detail: Option<String> },

    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl AppError {
    /// Log `err` in full and wrap it, keeping its text only when allowed
    pub fn internal(message: &str, err: impl Display, expose_detail: bool) -> Self {
        tracing::error!(error = %err, "{}", message);
        AppError::Internal {
            message: message.to_string(),
            detail: expose_detail.then(|| err.to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter(rejection.to_string())
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            detail: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Query(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(err.field().to_string()),
                    ..ErrorDetail::new(err.code(), err.to_string())
                },
            ),
            AppError::InvalidParameter(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_PARAMETER", msg.clone()),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", "Invalid or missing API key"),
            ),
            AppError::DataUnavailable { detail } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    detail: detail.clone(),
                    ..ErrorDetail::new("DATA_UNAVAILABLE", "Forecast data is temporarily unavailable")
                },
            ),
            AppError::Internal { message, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    detail: detail.clone(),
                    ..ErrorDetail::new("INTERNAL_ERROR", message.clone())
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = %error_detail.code, "Request failed: {}", self);
        } else {
            tracing::warn!(code = %error_detail.code, "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

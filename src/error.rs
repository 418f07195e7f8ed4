// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::ApiError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backend answered with an error the page cannot recover from.
    #[error("Backend error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err.status() {
            Some(StatusCode::NOT_FOUND) => {
                AppError::NotFound(err.server_message().unwrap_or_else(|| err.to_string()))
            }
            Some(StatusCode::UNAUTHORIZED) => AppError::Unauthorized,
            Some(status) if status.is_client_error() => AppError::Upstream {
                status,
                message: err.server_message().unwrap_or_else(|| err.to_string()),
            },
            _ => AppError::Upstream {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            },
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Upstream { status, message } if status.is_client_error() => {
                (*status, "backend_error", Some(message.clone()))
            }
            AppError::Upstream { message, .. } => {
                tracing::error!(error = %message, "Backend unavailable");
                (StatusCode::BAD_GATEWAY, "backend_unavailable", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

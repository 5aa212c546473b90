// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Spotify rejected credentials: {0}")]
    UpstreamAuth(String),

    #[error("Spotify API error: {0}")]
    Upstream(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Spotify answers 429.
    pub const SPOTIFY_RATE_LIMIT: &'static str = "Spotify rate limit exceeded";

    /// Whether this error means the user's Spotify grant is no longer usable.
    pub fn is_upstream_auth_error(&self) -> bool {
        matches!(self, AppError::UpstreamAuth(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        AppError::Validation(format!("invalid field(s): {}", fields.join(", ")))
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
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(msg.clone()),
            ),
            AppError::UpstreamAuth(msg) => {
                tracing::warn!(error = %msg, "Spotify authorization failed");
                (
                    StatusCode::UNAUTHORIZED,
                    "upstream_auth_error",
                    Some(msg.clone()),
                )
            }
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Spotify API error");
                (StatusCode::BAD_GATEWAY, "upstream_error", Some(msg.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
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

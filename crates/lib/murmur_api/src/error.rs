//! Application error types.

use std::fmt::Display;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use murmur_core::validation::FieldViolation;

use crate::models::ErrorResponse;

/// Message used for every validation failure.
pub const VALIDATION_MESSAGE: &str = "Validation error!";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// A domain rule rejected the request. The message is shown as-is.
    #[error("{0}")]
    BusinessRule(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected failure. `detail` is exposed in the response body.
    #[error("{message}: {detail}")]
    Internal { message: String, detail: String },
}

impl AppError {
    pub fn internal(message: impl Into<String>, detail: impl Display) -> Self {
        AppError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: false,
                    message: VALIDATION_MESSAGE.into(),
                    errors: Some(errors),
                    error: None,
                },
            ),
            AppError::BusinessRule(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: false,
                    message,
                    errors: None,
                    error: None,
                },
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    success: false,
                    message,
                    errors: None,
                    error: None,
                },
            ),
            AppError::Internal { message, detail } => {
                error!(%detail, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        success: false,
                        message,
                        errors: None,
                        error: Some(detail),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Undecodable bodies are a validation failure, not a framework error page.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldViolation {
            code: "invalid_json",
            path: Vec::new(),
            message: rejection.body_text(),
            expected: Some("object"),
            received: None,
        }])
    }
}

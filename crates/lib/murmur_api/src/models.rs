//! Response envelopes shared by every endpoint.

use serde::Serialize;

use murmur_core::store::StoreKind;
use murmur_core::validation::FieldViolation;

/// Successful response: `{success: true, message, data}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_thought: Option<usize>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_thought: None,
            data,
        }
    }

    pub fn with_total_thought(mut self, total: usize) -> Self {
        self.total_thought = Some(total);
        self
    }
}

/// Failure response: `{success: false, message, errors?, error?}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub store_connected: bool,
    pub store: StoreKind,
    pub version: String,
}

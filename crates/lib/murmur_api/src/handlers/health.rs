//! Health endpoint: store connectivity check.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{ApiResponse, HealthStatus};

/// `GET /health`: reports whether the document store answers.
pub async fn health_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<HealthStatus>>> {
    let store_connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Store ping failed: {e}");
            false
        }
    };

    Ok(Json(ApiResponse::ok(
        "Service is running",
        HealthStatus {
            store_connected,
            store: state.config.store,
            version: murmur_core::version().to_string(),
        },
    )))
}

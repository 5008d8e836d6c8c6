//! Chat message request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

use murmur_core::Document;
use murmur_core::models::Message;
use murmur_core::validation::validate;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ApiResponse;
use crate::services::message;

/// `POST /message`: store a chat message.
pub async fn create_message_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let Json(payload) = payload?;
    let new_message = validate::<Message>(&payload)
        .into_result()
        .map_err(AppError::Validation)?;

    let record = message::create_message(&state.repository(), new_message)
        .await
        .map_err(|e| e.into_app_error("Error sending message!"))?;
    Ok(Json(ApiResponse::ok("Message sent successfully!", record)))
}

/// `GET /messages/{conversation_id}`
pub async fn get_messages_handler(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Document>>>> {
    let records = message::get_conversation_messages(&state.repository(), &conversation_id)
        .await
        .map_err(|e| e.into_app_error("Error retrieving messages"))?;
    Ok(Json(ApiResponse::ok(
        "Messages retrieved successfully",
        records,
    )))
}

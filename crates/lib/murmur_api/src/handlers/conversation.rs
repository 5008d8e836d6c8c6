//! Conversation request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

use murmur_core::Document;
use murmur_core::models::Conversation;
use murmur_core::validation::validate;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ApiResponse;
use crate::services::conversation;

/// `POST /conversation`: start a conversation between members.
pub async fn create_conversation_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let Json(payload) = payload?;
    let new_conversation = validate::<Conversation>(&payload)
        .into_result()
        .map_err(AppError::Validation)?;

    let record = conversation::create_conversation(&state.repository(), new_conversation)
        .await
        .map_err(|e| e.into_app_error("Error creating conversation!"))?;
    Ok(Json(ApiResponse::ok(
        "Conversation created successfully!",
        record,
    )))
}

/// `GET /conversations/{conversation_id}`: conversations that list the id
/// among their members. An unknown id yields an empty list.
pub async fn get_user_conversations_handler(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Document>>>> {
    let records = conversation::get_user_conversations(&state.repository(), &member_id)
        .await
        .map_err(|e| e.into_app_error("Error retrieving conversations"))?;
    Ok(Json(ApiResponse::ok(
        "Conversations retrieved successfully",
        records,
    )))
}

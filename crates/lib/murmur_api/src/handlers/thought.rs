//! Thought request handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;

use murmur_core::Document;
use murmur_core::models::Thought;
use murmur_core::store::{DeleteOutcome, DeleteSummary, UpdateOutcome, UpdateSummary};
use murmur_core::validation::{validate, validate_patch};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ApiResponse;
use crate::services::thought;

const MISSING_THOUGHT: &str = "Invalid ID or thought does not exist";
const UNEXPECTED: &str = "Something went wrong !!!";

/// `POST /thought`: share today's thought.
pub async fn create_thought_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let Json(payload) = payload?;
    let new_thought = validate::<Thought>(&payload)
        .into_result()
        .map_err(AppError::Validation)?;

    let record = thought::create_thought(&state.repository(), new_thought)
        .await
        .map_err(|e| e.into_app_error("Error creating thought!"))?;
    Ok(Json(ApiResponse::ok("Thought created successfully!", record)))
}

/// `GET /thought`: every thought with the total count.
pub async fn list_thoughts_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Document>>>> {
    let listing = thought::get_all_thoughts(&state.repository())
        .await
        .map_err(|e| e.into_app_error(UNEXPECTED))?;
    Ok(Json(
        ApiResponse::ok("Thoughts retrieved successfully", listing.records)
            .with_total_thought(listing.total),
    ))
}

/// `GET /thought/{id}`: one thought by id.
pub async fn get_thought_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let record = thought::get_single_thought(&state.repository(), &id)
        .await
        .map_err(|e| e.into_app_error(UNEXPECTED))?
        .ok_or_else(|| AppError::NotFound(MISSING_THOUGHT.into()))?;
    Ok(Json(ApiResponse::ok(
        "Single thought retrieved successfully",
        record,
    )))
}

/// `PUT /thought/{id}`: overwrite the named fields only.
pub async fn update_thought_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UpdateSummary>>> {
    let Json(payload) = payload?;
    let patch = validate_patch::<Thought>(&payload)
        .into_result()
        .map_err(AppError::Validation)?;

    let outcome = thought::update_thought(&state.repository(), &id, patch)
        .await
        .map_err(|e| e.into_app_error("Error updating thought!"))?;
    match outcome {
        UpdateOutcome::NotFound => Err(AppError::NotFound(MISSING_THOUGHT.into())),
        UpdateOutcome::Matched(summary) => Ok(Json(ApiResponse::ok(
            "Thought updated successfully!",
            summary,
        ))),
    }
}

/// `DELETE /thought/{id}`
pub async fn delete_thought_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DeleteSummary>>> {
    let outcome = thought::delete_thought(&state.repository(), &id)
        .await
        .map_err(|e| e.into_app_error(UNEXPECTED))?;
    match outcome {
        DeleteOutcome::NotFound => Err(AppError::NotFound(MISSING_THOUGHT.into())),
        DeleteOutcome::Deleted(summary) => Ok(Json(ApiResponse::ok(
            "Thought deleted successfully!",
            summary,
        ))),
    }
}

/// `GET /thought/user/{user_id}`: the user's thought, if any.
pub async fn get_thought_by_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<Document>>> {
    let record = thought::get_thought_by_user(&state.repository(), &user_id)
        .await
        .map_err(|e| e.into_app_error("Error retrieving thought"))?
        .ok_or_else(|| AppError::NotFound("No thought found for this user".into()))?;
    Ok(Json(ApiResponse::ok("Thought retrieved successfully", record)))
}

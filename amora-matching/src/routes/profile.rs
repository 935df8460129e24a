use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::engine::compat::QuizAnswers;
use crate::engine::profile::ProfilePatch;
use crate::models::UserProfile;
use crate::AppState;

/// PATCH /profile - merge-patch; each setup call sends whichever fields it has
pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    patch
        .validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let profile = state.engine.apply_profile_patch(user.id, &patch).await?;
    Ok(Json(ApiResponse::ok_with_message(
        profile,
        "Profile updated successfully",
    )))
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub quiz_answers: QuizAnswers,
}

/// POST /quiz
pub async fn submit_quiz(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuizRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.engine.submit_quiz(user.id, req.quiz_answers).await?;
    Ok(Json(ApiResponse::ok_with_message(
        profile,
        "Quiz submitted successfully",
    )))
}

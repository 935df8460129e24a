use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use amora_shared::errors::AppResult;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::engine::streak::StreakInfo;
use crate::events::publisher;
use crate::AppState;

/// POST /streak
pub async fn update_streak(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<StreakInfo>>> {
    let info = state.engine.update_streak(user.id, Utc::now()).await?;

    if let Some(streak) = info.milestone {
        publisher::publish_streak_milestone(&state.rabbitmq, user.id, streak).await;
    }

    Ok(Json(ApiResponse::ok(info)))
}

#[derive(Debug, Serialize)]
pub struct StreakSeenResponse {
    pub seen: bool,
}

/// POST /streak/seen
pub async fn mark_streak_seen(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<StreakSeenResponse>>> {
    state.engine.mark_streak_seen(user.id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(StreakSeenResponse { seen: true })))
}
